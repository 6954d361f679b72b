use std::{
    borrow::Cow,
    io::{Cursor, Read},
};

use zip::ZipArchive;

use crate::ExportError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const EMPTY_ZIP_MAGIC: &[u8] = b"PK\x05\x06";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const EXPORT_FILE_NAME: &str = "export.xml";
/// Clinical records export that ships next to `export.xml`; never the payload.
const CDA_FILE_NAME: &str = "export_cda.xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xml,
    Zip,
}

impl ExportFormat {
    /// Sniffs the container from its leading bytes; the uploaded file name is
    /// not trusted.
    pub fn detect(raw: &[u8]) -> Option<Self> {
        if raw.starts_with(ZIP_MAGIC) || raw.starts_with(EMPTY_ZIP_MAGIC) {
            return Some(Self::Zip);
        }

        let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
        let first = body.iter().find(|b| !b.is_ascii_whitespace())?;
        (*first == b'<').then_some(Self::Xml)
    }
}

/// Returns the XML payload of the export, unwrapping a ZIP container when
/// needed.
pub(crate) fn open_payload(raw: &[u8], format: ExportFormat) -> Result<Cow<'_, [u8]>, ExportError> {
    match format {
        ExportFormat::Xml => Ok(Cow::Borrowed(raw)),
        ExportFormat::Zip => {
            let mut archive = ZipArchive::new(Cursor::new(raw))?;
            let name = find_export_entry(archive.file_names())?;
            debug!("reading `{}` from ZIP archive", name);

            let mut xml = Vec::new();
            archive
                .by_name(&name)?
                .read_to_end(&mut xml)
                .map_err(zip::result::ZipError::Io)?;
            Ok(Cow::Owned(xml))
        }
    }
}

fn find_export_entry<'a>(names: impl Iterator<Item = &'a str>) -> Result<String, ExportError> {
    let candidates = names
        .filter(|name| !name.ends_with('/'))
        .filter(|name| file_name(name).to_ascii_lowercase().ends_with(".xml"))
        .filter(|name| !file_name(name).starts_with("._"))
        .map(str::to_owned)
        .collect::<Vec<_>>();

    if let Some(export) = candidates
        .iter()
        .find(|name| file_name(name).eq_ignore_ascii_case(EXPORT_FILE_NAME))
    {
        return Ok(export.clone());
    }

    let mut others = candidates
        .into_iter()
        .filter(|name| !file_name(name).eq_ignore_ascii_case(CDA_FILE_NAME))
        .collect::<Vec<_>>();

    match others.len() {
        0 => Err(ExportError::MissingXml),
        1 => Ok(others.remove(0)),
        _ => Err(ExportError::AmbiguousXml(others)),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
