use std::collections::HashMap;

use quick_xml::{Reader, events::Event};
use sleepwell_types::Observation;

use crate::{
    ExportError, ExportFormat,
    container::open_payload,
    record::{RawRecord, Skip},
};

const RECORD_TAG: &[u8] = b"Record";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractStats {
    pub records_seen: usize,
    pub kept: usize,
    pub unknown_type: usize,
    pub invalid: usize,
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub observations: Vec<Observation>,
    pub stats: ExtractStats,
}

/// Parses a health export into observations, in export order.
///
/// `format` is sniffed from the payload when `None`. Unknown record types and
/// unusable samples are skipped; the call only fails when the payload is not
/// an export at all.
pub fn extract(raw: &[u8], format: Option<ExportFormat>) -> Result<Vec<Observation>, ExportError> {
    extract_with_stats(raw, format).map(|extraction| extraction.observations)
}

pub fn extract_with_stats(
    raw: &[u8],
    format: Option<ExportFormat>,
) -> Result<Extraction, ExportError> {
    if raw.is_empty() {
        return Err(ExportError::Empty);
    }

    let format = format
        .or_else(|| ExportFormat::detect(raw))
        .ok_or(ExportError::UnknownContainer)?;
    let payload = open_payload(raw, format)?;

    let extraction = parse_records(&payload)?;
    if extraction.stats.records_seen == 0 {
        return Err(ExportError::NoRecords);
    }

    let stats = &extraction.stats;
    info!(
        "extracted {} observations from {} records ({} unknown type, {} invalid)",
        stats.kept, stats.records_seen, stats.unknown_type, stats.invalid
    );

    Ok(extraction)
}

fn parse_records(xml: &[u8]) -> Result<Extraction, ExportError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut extraction = Extraction::default();
    let mut skipped: HashMap<Skip, usize> = HashMap::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let record = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.name().as_ref() == RECORD_TAG =>
            {
                RawRecord::from_element(&element)
            }
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(source) => {
                return Err(ExportError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                });
            }
        };

        extraction.stats.records_seen += 1;
        let observation = record.and_then(|record| {
            let record_type = log_enabled!(log::Level::Trace).then(|| record.record_type.clone());
            record.into_observation().inspect_err(|skip| {
                if *skip != Skip::UnknownType {
                    trace!(
                        "skipping {} record: {:?}",
                        record_type.as_deref().unwrap_or_default(),
                        skip
                    );
                }
            })
        });

        match observation {
            Ok(observation) => {
                extraction.stats.kept += 1;
                extraction.observations.push(observation);
            }
            Err(skip) => {
                if skip == Skip::UnknownType {
                    extraction.stats.unknown_type += 1;
                } else {
                    extraction.stats.invalid += 1;
                }

                let count = skipped.entry(skip).or_default();
                if *count == 0 && skip != Skip::UnknownType {
                    warn!("dropping records that cannot be used: {:?}", skip);
                }
                *count += 1;
            }
        }
    }

    for (skip, count) in skipped {
        debug!("skipped {} records: {:?}", count, skip);
    }

    Ok(extraction)
}
