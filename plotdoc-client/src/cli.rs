//! Command line arguments of the `plotdoc` binary.

use crate::error::ClientError;
use plotdoc_core::PropertyId;
use std::path::PathBuf;

pub const USAGE: &str = "plotdoc [--config <file>] <property_id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub property_id: PropertyId,
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config_path = None;
        let mut property_id = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                let path = args
                    .next()
                    .ok_or_else(|| ClientError::Usage(format!("--config needs a path; {}", USAGE)))?;
                config_path = Some(PathBuf::from(path));
            } else if property_id.is_none() {
                let id = arg.parse::<i64>().map_err(|_| {
                    ClientError::Usage(format!("'{}' is not a property id; {}", arg, USAGE))
                })?;
                property_id = Some(PropertyId::new(id));
            } else {
                return Err(ClientError::Usage(format!("unexpected argument '{}'; {}", arg, USAGE)));
            }
        }

        let property_id = property_id.ok_or_else(|| ClientError::Usage(USAGE.to_string()))?;
        Ok(Self {
            config_path,
            property_id,
        })
    }
}
