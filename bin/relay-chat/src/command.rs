/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Message(&'a str),
    Clear,
    Model(Option<&'a str>),
    Models,
    Health,
    Usage,
    Help,
    Quit,
    Unknown(&'a str),
    Blank,
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Blank;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Input::Message(line);
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        match name {
            "clear" => Input::Clear,
            "model" => Input::Model(arg),
            "models" => Input::Models,
            "health" => Input::Health,
            "usage" => Input::Usage,
            "help" | "?" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(name),
        }
    }
}

pub const HELP: &str = "\
/clear         start a new conversation
/model <id>    switch model (clears the conversation)
/models        list models offered by the provider
/health        show relay status
/usage         show usage of the last reply
/quit          leave";
