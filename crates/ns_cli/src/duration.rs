use std::str::FromStr;
use std::time::Duration;

/// Durations written like `30s`, `1m30s` or `500ms`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut current_number = String::new();
        let mut chars = s.trim().chars().peekable();
        let mut parsed_any = false;

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }

            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            current_number.clear();

            total += match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    Duration::from_millis(num)
                }
                's' => Duration::from_secs(num),
                'm' => Duration::from_secs(num * 60),
                'h' => Duration::from_secs(num * 3600),
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            parsed_any = true;
        }

        if !current_number.is_empty() {
            let num: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total += Duration::from_secs(num);
            parsed_any = true;
        }

        if !parsed_any {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Duration {
        s.parse::<HumanDuration>().unwrap().0
    }

    #[test]
    fn test_units() {
        assert_eq!(parse("30"), Duration::from_secs(30));
        assert_eq!(parse("30s"), Duration::from_secs(30));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("1h"), Duration::from_secs(3600));
        assert_eq!(parse("1m30s"), Duration::from_secs(90));
        assert_eq!(parse("1500ms"), Duration::from_millis(1500));
        assert_eq!(parse("1s 500ms"), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
        assert!("10d".parse::<HumanDuration>().is_err());
        assert!("ten seconds".parse::<HumanDuration>().is_err());
    }
}
