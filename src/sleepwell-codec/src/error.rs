use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export is empty")]
    Empty,
    #[error("export is neither an XML document nor a ZIP archive")]
    UnknownContainer,
    #[error("invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("ZIP archive does not contain an export XML file")]
    MissingXml,
    #[error("ZIP archive contains several XML files and no export.xml: {0:?}")]
    AmbiguousXml(Vec<String>),
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: u64,
        source: quick_xml::Error,
    },
    #[error("no health records found in export")]
    NoRecords,
}
