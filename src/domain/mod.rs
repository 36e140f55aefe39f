mod sport;
mod sport_line;

pub use sport::{parse_sports_lenient, Sport, UnsupportedSportError, SUPPORTED_SPORTS};
pub use sport_line::{parse_score, InvalidScoreError, SportLine};
