use thiserror::Error;

/// A `"<numerator>/<denominator>"` pair such as paid/billed installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    /// `numerator / denominator`, or `None` when nothing was counted.
    pub fn fraction(self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatioError {
    #[error("malformed ratio {0:?}: expected \"<n>/<m>\"")]
    Malformed(String),
}

/// Splits on the first `/` and reads both sides as non-negative integers.
///
/// A zero denominator is accepted here; dividing is the caller's business.
pub fn parse_ratio(value: &str) -> Result<Ratio, RatioError> {
    let malformed = || RatioError::Malformed(value.to_string());
    let (left, right) = value.split_once('/').ok_or_else(malformed)?;
    let numerator = left.trim().parse::<u64>().map_err(|_| malformed())?;
    let denominator = right.trim().parse::<u64>().map_err(|_| malformed())?;

    Ok(Ratio {
        numerator,
        denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_ratio() {
        let ratio = parse_ratio("3/10").unwrap();
        assert_eq!(ratio.numerator, 3);
        assert_eq!(ratio.denominator, 10);
        assert_eq!(ratio.fraction(), Some(0.3));
    }

    #[test]
    fn tolerates_spaces_around_numbers() {
        assert_eq!(
            parse_ratio(" 5 / 8 ").unwrap(),
            Ratio {
                numerator: 5,
                denominator: 8
            }
        );
    }

    #[test]
    fn zero_denominator_is_not_rejected() {
        let ratio = parse_ratio("0/0").unwrap();
        assert_eq!(ratio.denominator, 0);
        assert_eq!(ratio.fraction(), None);
    }

    #[test]
    fn rejects_non_numeric_sides() {
        assert!(parse_ratio("invalid").is_err());
        assert!(parse_ratio("a/10").is_err());
        assert!(parse_ratio("10/").is_err());
        assert!(parse_ratio("-1/10").is_err());
        assert!(parse_ratio("2.5/10").is_err());
    }

    #[test]
    fn splits_on_first_slash_only() {
        assert!(matches!(
            parse_ratio("1/2/3"),
            Err(RatioError::Malformed(value)) if value == "1/2/3"
        ));
    }
}
