//! Line commands understood by the interactive shell.

pub const HELP: &str = "\
commands:
  go <path>              open `/` (catalog) or `/order`
  refresh                reload the catalog
  set <field> <value>    edit item_id, quantity or customer_email
  submit                 send the current order draft
  whoami                 show the signed-in user
  sign-out               sign out and close the storefront
  help                   show this text
  quit                   leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Go(String),
    Refresh,
    Set { field: String, value: String },
    Submit,
    WhoAmI,
    SignOut,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "go" if !rest.is_empty() => Ok(ShellCommand::Go(rest.to_string())),
            "go" => Err("usage: go <path>".to_string()),
            "refresh" => Ok(ShellCommand::Refresh),
            "set" => {
                let Some((field, value)) = rest.split_once(char::is_whitespace) else {
                    // `set customer_email` with no value clears the field.
                    if rest.is_empty() {
                        return Err("usage: set <field> <value>".to_string());
                    }
                    return Ok(ShellCommand::Set {
                        field: rest.to_string(),
                        value: String::new(),
                    });
                };
                Ok(ShellCommand::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                })
            }
            "submit" => Ok(ShellCommand::Submit),
            "whoami" => Ok(ShellCommand::WhoAmI),
            "sign-out" | "signout" => Ok(ShellCommand::SignOut),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command {other:?}; type `help`")),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShellCommand::Go(_) => "go",
            ShellCommand::Refresh => "refresh",
            ShellCommand::Set { .. } => "set",
            ShellCommand::Submit => "submit",
            ShellCommand::WhoAmI => "whoami",
            ShellCommand::SignOut => "sign_out",
            ShellCommand::Help => "help",
            ShellCommand::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert_eq!(
            ShellCommand::parse("go /order"),
            Ok(ShellCommand::Go("/order".into()))
        );
        assert!(ShellCommand::parse("go").is_err());
    }

    #[test]
    fn set_keeps_value_spacing() {
        assert_eq!(
            ShellCommand::parse("set item_id  A 1 "),
            Ok(ShellCommand::Set {
                field: "item_id".into(),
                value: "A 1".into(),
            })
        );
        assert_eq!(
            ShellCommand::parse("set customer_email"),
            Ok(ShellCommand::Set {
                field: "customer_email".into(),
                value: String::new(),
            })
        );
        assert!(ShellCommand::parse("set").is_err());
    }

    #[test]
    fn aliases_and_unknowns() {
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("signout"), Ok(ShellCommand::SignOut));
        assert_eq!(ShellCommand::parse("  "), Err(String::new()));
        assert!(ShellCommand::parse("dance")
            .expect_err("unknown")
            .contains("dance"));
    }
}
