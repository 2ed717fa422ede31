//! Line commands accepted by `refinery shell`.

use refinery_core::{ExtractionMode, Facet, InputError, RequestOptions};

pub const HELP: &str = "\
commands:
  mode <scrape|crawl|map|search>
  set <option> <value>   wait-for, target, remove, images, summarize,
                         formats, depth, pages, limit
  go <url or query>      submit (supersedes a running request)
  page <n>               select result page n (1-based)
  facet <preview|raw|screenshot|document>
  combined               toggle the combined search page
  export                 write the current page to the output directory
  show                   print the current view again
  reset                  back to the empty screen
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Mode(ExtractionMode),
    Set(OptionEdit),
    Go(String),
    /// 0-based page index.
    Page(usize),
    Facet(Facet),
    Combined,
    Export,
    Show,
    Reset,
    Help,
    Quit,
}

/// One edit to the shared option fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionEdit {
    WaitFor(String),
    Target(String),
    Remove(String),
    IncludeImages(bool),
    Summarize(bool),
    Formats(Vec<String>),
    MaxDepth(i64),
    MaxPages(i64),
    Limit(i64),
}

impl OptionEdit {
    pub fn apply(self, options: &mut RequestOptions) {
        match self {
            OptionEdit::WaitFor(value) => options.wait_for_selector = value,
            OptionEdit::Target(value) => options.target_selector = value,
            OptionEdit::Remove(value) => options.remove_selector = value,
            OptionEdit::IncludeImages(value) => options.include_images = value,
            OptionEdit::Summarize(value) => options.summarize = value,
            OptionEdit::Formats(value) => options.formats = value,
            OptionEdit::MaxDepth(value) => options.max_depth = value,
            OptionEdit::MaxPages(value) => options.max_pages = value,
            OptionEdit::Limit(value) => options.limit = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ShellError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "mode" => ShellCommand::Mode(required("mode", rest)?.parse()?),
        "set" => ShellCommand::Set(parse_option(required("set", rest)?)?),
        "go" => ShellCommand::Go(required("go", rest)?.to_string()),
        "page" => {
            let value = required("page", rest)?;
            match value.parse::<usize>() {
                Ok(n) if n > 0 => ShellCommand::Page(n - 1),
                _ => return Err(invalid("page", value)),
            }
        }
        "facet" => ShellCommand::Facet(required("facet", rest)?.parse()?),
        "combined" => ShellCommand::Combined,
        "export" => ShellCommand::Export,
        "show" => ShellCommand::Show,
        "reset" => ShellCommand::Reset,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_option(rest: &str) -> Result<OptionEdit, ShellError> {
    let (name, value) = match rest.split_once(char::is_whitespace) {
        Some((name, value)) => (name, value.trim()),
        None => (rest, ""),
    };
    let edit = match name.to_ascii_lowercase().as_str() {
        "wait-for" => OptionEdit::WaitFor(value.to_string()),
        "target" => OptionEdit::Target(value.to_string()),
        "remove" => OptionEdit::Remove(value.to_string()),
        "images" => OptionEdit::IncludeImages(parse_switch("images", value)?),
        "summarize" => OptionEdit::Summarize(parse_switch("summarize", value)?),
        "formats" => OptionEdit::Formats(
            value
                .split(',')
                .map(str::trim)
                .filter(|format| !format.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        "depth" => OptionEdit::MaxDepth(parse_number("depth", value)?),
        "pages" => OptionEdit::MaxPages(parse_number("pages", value)?),
        "limit" => OptionEdit::Limit(parse_number("limit", value)?),
        other => return Err(ShellError::UnknownOption(other.to_string())),
    };
    Ok(edit)
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ShellError> {
    if rest.is_empty() {
        Err(ShellError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn parse_switch(name: &'static str, value: &str) -> Result<bool, ShellError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<i64, ShellError> {
    value.parse().map_err(|_| invalid(name, value))
}

fn invalid(name: &'static str, value: &str) -> ShellError {
    ShellError::InvalidValue {
        name,
        value: value.to_string(),
    }
}
