use super::MetadataReader;
use crate::error::ReadError;
use crate::model::Attributes;
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, OpenFileOptions};
use std::path::Path;

/// Reads series attributes from DICOM Part 10 files. Parsing stops at Pixel Data.
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomReader;

impl MetadataReader for DicomReader {
    fn read(&self, path: &Path) -> Result<Attributes, ReadError> {
        let obj = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|e| match e {
                dicom_object::ReadError::OpenFile { source, .. } => ReadError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                other => ReadError::Unrecognized {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        Ok(Attributes {
            series_instance_uid: string_field(&obj, tags::SERIES_INSTANCE_UID),
            protocol_name: string_field(&obj, tags::PROTOCOL_NAME),
            series_number: int_field(&obj, tags::SERIES_NUMBER),
            instance_number: int_field(&obj, tags::INSTANCE_NUMBER),
        })
    }
}

fn string_field(obj: &DefaultDicomObject, tag: Tag) -> String {
    obj.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|value| value.trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
        .unwrap_or_default()
}

fn int_field(obj: &DefaultDicomObject, tag: Tag) -> i32 {
    obj.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
        .unwrap_or(0)
}
