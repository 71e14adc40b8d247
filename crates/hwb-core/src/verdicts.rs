/// Human-readable text for a homework review verdict.
///
/// The texts reach the user verbatim and are a fixed contract; do not reword
/// or localize them.
pub fn verdict_for(status: &str) -> Option<&'static str> {
    match status {
        "approved" => Some("Работа проверена: ревьюеру всё понравилось. Ура!"),
        "reviewing" => Some("Работа взята на проверку ревьюером."),
        "rejected" => Some("Работа проверена: у ревьюера есть замечания."),
        _ => None,
    }
}
