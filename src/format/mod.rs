pub mod codec;
pub mod convert;

pub use codec::{
    FormatError, detect_file_format, parse_export, parse_family_bundle, parse_import,
    serialize_export, serialize_family_bundle,
};
pub use convert::{export_to_mode, mode_to_export, modes_from_family};
