use std::str::FromStr;

use thiserror::Error;

use crate::domain::Field;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    List,
    Set(Field, String),
    Submit,
    Clear,
    Search(String),
    /// 1-based row of the displayed list.
    Edit(usize),
    Save,
    Cancel,
    /// 1-based row of the displayed list.
    Delete(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help` for the list of commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    MissingArgument(&'static str),
    #[error("{0}")]
    InvalidField(String),
    #[error("Row must be a positive number, got `{0}`")]
    InvalidRow(String),
}

pub const HELP: &str = "\
Commands:
  register                 show the registration form
  list                     show the employee list
  set <field> <value>      fill a field (name, surname, age, idNumber, role, photo)
  photo <path>             attach a photo file
  submit                   register the employee in the form
  clear                    empty the registration form
  search [term]            filter the list by ID number (empty term shows all)
  edit <row>               edit a listed employee
  save | cancel            confirm or discard the edit
  delete <row>             delete a listed employee
  help                     show this help
  quit                     exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = split_word(line);

        match word.to_ascii_lowercase().as_str() {
            "register" | "form" => Ok(Command::Register),
            "list" | "view" => Ok(Command::List),
            "set" => {
                let (field, value) = split_word(rest);
                if field.is_empty() {
                    return Err(CommandError::MissingArgument("set <field> <value>"));
                }
                let field = field.parse::<Field>().map_err(CommandError::InvalidField)?;
                Ok(Command::Set(field, value.to_string()))
            }
            "photo" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("photo <path>"));
                }
                Ok(Command::Set(Field::Photo, rest.to_string()))
            }
            "submit" => Ok(Command::Submit),
            "clear" => Ok(Command::Clear),
            "search" => Ok(Command::Search(rest.to_string())),
            "edit" => parse_row(rest, "edit <row>").map(Command::Edit),
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "delete" => parse_row(rest, "delete <row>").map(Command::Delete),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn parse_row(text: &str, usage: &'static str) -> Result<usize, CommandError> {
    if text.is_empty() {
        return Err(CommandError::MissingArgument(usage));
    }
    text.parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .ok_or_else(|| CommandError::InvalidRow(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_form_commands() {
        assert_eq!("register".parse::<Command>(), Ok(Command::Register));
        assert_eq!("  LIST ".parse::<Command>(), Ok(Command::List));
        assert_eq!("set name John".parse::<Command>(), Ok(Command::Set(Field::Name, "John".into())));
        assert_eq!("set role Head of Sales".parse::<Command>(), Ok(Command::Set(Field::Role, "Head of Sales".into())));
        assert_eq!("set age".parse::<Command>(), Ok(Command::Set(Field::Age, String::new())));
        assert_eq!("photo /tmp/me.png".parse::<Command>(), Ok(Command::Set(Field::Photo, "/tmp/me.png".into())));
        assert_eq!("submit".parse::<Command>(), Ok(Command::Submit));
    }

    #[test]
    fn parses_list_commands() {
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
        assert_eq!("search 8501".parse::<Command>(), Ok(Command::Search("8501".into())));
        assert_eq!("edit 2".parse::<Command>(), Ok(Command::Edit(2)));
        assert_eq!("delete 1".parse::<Command>(), Ok(Command::Delete(1)));
        assert_eq!("save".parse::<Command>(), Ok(Command::Save));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("dance".parse::<Command>(), Err(CommandError::Unknown("dance".into())));
        assert_eq!("set".parse::<Command>(), Err(CommandError::MissingArgument("set <field> <value>")));
        assert!(matches!("set salary 10".parse::<Command>(), Err(CommandError::InvalidField(_))));
        assert_eq!("delete 0".parse::<Command>(), Err(CommandError::InvalidRow("0".into())));
        assert_eq!("edit x".parse::<Command>(), Err(CommandError::InvalidRow("x".into())));
        assert_eq!("delete".parse::<Command>(), Err(CommandError::MissingArgument("delete <row>")));
    }
}
