use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigParseError {
    #[error("unknown value kind `{name}`{}", did_you_mean(.suggestion))]
    UnknownValueKind {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("unknown call kind `{name}`{}", did_you_mean(.suggestion))]
    UnknownCallKind {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("signature `{0}` is missing `->` between parameters and returns")]
    MissingArrow(String),
}

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|name| format!(" (did you mean `{name}`?)"))
        .unwrap_or_default()
}
