//! Error types shared by the library and the binaries.

use std::{error, fmt, result};

pub type Result<T> = result::Result<T, Box<dyn error::Error>>;

/// Content that cannot be used: a CSV without the required columns, a
/// broken lexicon or conclusion table.
#[derive(Debug)]
pub struct BadData(pub String);

/// A filter or summary setting outside its allowed range.
#[derive(Debug)]
pub struct InvalidSetting(pub String);

/// The review file (or another data file) could not be opened or read.
#[derive(Debug)]
pub struct DataSourceUnavailable(pub String);

impl fmt::Display for BadData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bad data: {}", self.0)
    }
}

impl fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid setting: {}", self.0)
    }
}

impl fmt::Display for DataSourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "data source unavailable: {}", self.0)
    }
}

impl error::Error for BadData {}
impl error::Error for InvalidSetting {}
impl error::Error for DataSourceUnavailable {}

pub fn bad_data(s: impl Into<String>) -> Box<dyn error::Error> {
    Box::new(BadData(s.into()))
}

pub fn invalid_setting(s: impl Into<String>) -> Box<dyn error::Error> {
    Box::new(InvalidSetting(s.into()))
}

pub fn data_source_unavailable(s: impl Into<String>) -> Box<dyn error::Error> {
    Box::new(DataSourceUnavailable(s.into()))
}

/// Did the error come from an unreadable data source?
pub fn is_data_source_unavailable(e: &(dyn error::Error + 'static)) -> bool {
    e.downcast_ref::<DataSourceUnavailable>().is_some()
}

/// Was the error caused by a rejected setting?
pub fn is_invalid_setting(e: &(dyn error::Error + 'static)) -> bool {
    e.downcast_ref::<InvalidSetting>().is_some()
}
