use super::sport::Sport;

/// The authoritative representation of a single sport's current odds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SportLine {
    pub sport: Sport,
    pub score: f32,
}

impl SportLine {
    pub fn new(sport: Sport, score: f32) -> Self {
        Self { sport, score }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid score")]
pub struct InvalidScoreError;

/// Parses the decimal-string score the lines-provider returns, the way
/// `SportLine.SetScore` does in the original service.
pub fn parse_score(raw: &str) -> Result<f32, InvalidScoreError> {
    raw.trim().parse::<f32>().map_err(|_| InvalidScoreError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_score() {
        assert_eq!(parse_score("0.82").unwrap(), 0.82_f32);
    }

    #[test]
    fn rejects_non_numeric_score() {
        assert_eq!(parse_score("hello"), Err(InvalidScoreError));
    }
}
