use rentwise_core::domain::profile::ProfileField;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { field: ProfileField, raw: String },
    Profile,
    Analyze,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    // Allow `income=4000` as well as `income 4000`.
    let (head, rest) = match head.split_once('=') {
        Some((h, r)) if rest.is_empty() => (h, r.trim()),
        _ => (head, rest),
    };

    match head.to_ascii_lowercase().as_str() {
        "profile" | "show" => Command::Profile,
        "analyze" | "analyse" | "submit" | "calculate" => Command::Analyze,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => match head.parse::<ProfileField>() {
            Ok(field) => Command::Set {
                field,
                raw: rest.to_string(),
            },
            Err(_) => Command::Unknown(head.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits() {
        assert_eq!(
            parse("income 4000"),
            Command::Set {
                field: ProfileField::MonthlyIncome,
                raw: "4000".to_string()
            }
        );
        assert_eq!(
            parse("  Savings=$500 "),
            Command::Set {
                field: ProfileField::SavingsGoal,
                raw: "$500".to_string()
            }
        );
        assert_eq!(
            parse("debt"),
            Command::Set {
                field: ProfileField::MonthlyDebt,
                raw: String::new()
            }
        );
    }

    #[test]
    fn parses_verbs() {
        assert_eq!(parse("analyze"), Command::Analyze);
        assert_eq!(parse("SUBMIT"), Command::Analyze);
        assert_eq!(parse("profile"), Command::Profile);
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse("   "), Command::Empty);
        assert_eq!(parse("rent 1200"), Command::Unknown("rent".to_string()));
    }
}
