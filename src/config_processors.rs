use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strip surrounding quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every configuration value and removes one pair of surrounding
    /// quotes (`"` or `'`) when present. Unquoted values pass through
    /// unchanged, so paths never need quoting in the config file.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|value| {
            let value = value.trim();

            let quoted = value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')));
            if quoted {
                MapAction::Replace(vec![value[1..value.len() - 1].to_owned()])
            } else {
                MapAction::Keep
            }
        })
    }
}
