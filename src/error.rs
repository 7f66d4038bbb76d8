use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::Result as FmtResult;
use std::fmt::{Display, Formatter};
use std::result::Result as StdResult;

pub(crate) const WRONG_OFFSET: &str = "Wrong buffer offset detected";

/// Part of the output file that was being emitted when a write failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Creating or truncating the destination file.
    Open,
    /// Fixed 48 byte file header.
    Header,
    /// XML metadata section.
    Xml,
    /// Zero bytes between XML section and binary section or between payloads.
    Padding,
    /// Binary point payload.
    Payload,
    /// Final flush of the destination.
    Flush,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let name = match self {
            Stage::Open => "open",
            Stage::Header => "header",
            Stage::Xml => "xml",
            Stage::Padding => "padding",
            Stage::Payload => "payload",
            Stage::Flush => "flush",
        };
        write!(f, "{name}")
    }
}

/// Possible errors that can occur while building, writing or inspecting fixtures.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Something went wrong while emitting a fixture.
    /// The stage tells which part of the file was in progress.
    Write {
        stage: Stage,
        desc: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// Something went wrong while reading back an artifact.
    Read {
        desc: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// The inspected data cannot be interpreted at all,
    /// for example because it is shorter than a header or the XML is not well-formed.
    Invalid {
        desc: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// An unexpected internal issue occured.
    Internal {
        desc: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },
}

impl Error {
    /// Creates an invalid data error from text.
    pub fn invalid<T, C>(desc: C) -> Result<T>
    where
        C: Display,
    {
        Err(Error::Invalid {
            desc: desc.to_string(),
            source: None,
        })
    }

    /// Returns the write stage for write errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Write { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Error::Write { stage, desc, .. } => {
                write!(f, "Failed to write fixture ({stage} stage): {desc}")
            }
            Error::Read { desc, .. } => write!(f, "Failed to read fixture: {desc}"),
            Error::Invalid { desc, .. } => write!(f, "Invalid fixture data: {desc}"),
            Error::Internal { desc, .. } => write!(f, "Internal error: {desc}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Write { source, .. }
            | Error::Read { source, .. }
            | Error::Invalid { source, .. }
            | Error::Internal { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn StdError + 'static)),
        }
    }
}

/// Custom result type hard-wiring the library error type.
pub type Result<T> = StdResult<T, Error>;

/// Converts other errors and options into library errors.
pub(crate) trait Converter<T, E> {
    fn write_err<C>(self, stage: Stage, context: C) -> Result<T>
    where
        C: Display;

    fn read_err<C>(self, context: C) -> Result<T>
    where
        C: Display;

    fn invalid_err<C>(self, context: C) -> Result<T>
    where
        C: Display;

    fn internal_err<C>(self, context: C) -> Result<T>
    where
        C: Display;
}

impl<T, E> Converter<T, E> for StdResult<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn write_err<C>(self, stage: Stage, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| Error::Write {
            stage,
            desc: context.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn read_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| Error::Read {
            desc: context.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn invalid_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| Error::Invalid {
            desc: context.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn internal_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| Error::Internal {
            desc: context.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

impl<T> Converter<T, Infallible> for Option<T> {
    fn write_err<C>(self, stage: Stage, context: C) -> Result<T>
    where
        C: Display,
    {
        self.ok_or_else(|| Error::Write {
            stage,
            desc: context.to_string(),
            source: None,
        })
    }

    fn read_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.ok_or_else(|| Error::Read {
            desc: context.to_string(),
            source: None,
        })
    }

    fn invalid_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.ok_or_else(|| Error::Invalid {
            desc: context.to_string(),
            source: None,
        })
    }

    fn internal_err<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.ok_or_else(|| Error::Internal {
            desc: context.to_string(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn write_error_names_stage() {
        let res: StdResult<(), IoError> = Err(IoError::new(ErrorKind::Other, "disk full"));
        let err = res.write_err(Stage::Padding, "Failed to write zeros").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Padding));
        assert_eq!(
            err.to_string(),
            "Failed to write fixture (padding stage): Failed to write zeros"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn option_conversion() {
        let none: Option<u8> = None;
        let err = none.invalid_err("Nothing there").unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
        assert!(err.stage().is_none());
        assert_eq!(Some(7_u8).read_err("unused").unwrap(), 7);
    }
}
