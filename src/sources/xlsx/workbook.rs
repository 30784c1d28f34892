use crate::sources::cell::{cell_text, date_time_value, is_empty, typed_date_time, DATE_TIME_FORMAT};
use crate::sources::xlsx::date_format::{is_date_format, DateRenderer};
use crate::sources::xlsx::styles::{cell_styles, sheet_parts, NumberFormats};
use crate::sources::xlsx::{FormattedCell, ModernSheet, ModernWorkbook};
use crate::sources::{SourceError, SourceResult};
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// A zipped-XML workbook decoded by `calamine`.
///
/// Cell values come from the decoder. Display formats are read from the workbook's style and
/// worksheet parts, and date-formatted values are shown the way their format displays them.
pub struct CalamineXlsx {
    workbook: Xlsx<BufReader<File>>,
    parts: ZipArchive<BufReader<File>>,
    formats: NumberFormats,
    sheets: Vec<Option<String>>,
    path: PathBuf,
}

/// Reads an archive part, matching its name without regard to ASCII case.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str, path: &Path) -> SourceResult<Option<Vec<u8>>> {
    let Some(actual) = archive
        .file_names()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
        .map(str::to_owned)
    else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    archive
        .by_name(&actual)
        .map_err(|err| SourceError::open(path, err))?
        .read_to_end(&mut bytes)
        .map_err(|err| SourceError::open(path, err))?;
    Ok(Some(bytes))
}

impl CalamineXlsx {
    pub fn open(path: &Path) -> SourceResult<Self> {
        let workbook: Xlsx<_> = open_workbook(path)
            .map_err(|err: XlsxError| SourceError::open(path, err))?;

        let file = File::open(path).map_err(|err| SourceError::open(path, err))?;
        let mut parts = ZipArchive::new(BufReader::new(file)).map_err(|err| SourceError::open(path, err))?;
        let formats = match read_part(&mut parts, "xl/styles.xml", path)? {
            Some(xml) => NumberFormats::parse(xml.as_slice()).map_err(|err| SourceError::open(path, err))?,
            None => NumberFormats::default(),
        };
        let sheets = match (
            read_part(&mut parts, "xl/workbook.xml", path)?,
            read_part(&mut parts, "xl/_rels/workbook.xml.rels", path)?,
        ) {
            (Some(workbook), Some(rels)) => sheet_parts(workbook.as_slice(), rels.as_slice())
                .map_err(|err| SourceError::open(path, err))?,
            _ => Vec::new(),
        };
        debug!(path = %path.display(), sheets = sheets.len(), "opened xlsx workbook");

        Ok(Self { workbook, parts, formats, sheets, path: path.to_path_buf() })
    }

    /// Style indices of the explicitly styled cells of the sheet at `index`.
    fn styles_of(&mut self, index: usize) -> SourceResult<HashMap<(u32, u32), usize>> {
        let Some(Some(name)) = self.sheets.get(index) else {
            return Ok(HashMap::new());
        };
        match read_part(&mut self.parts, name, &self.path)? {
            Some(xml) => cell_styles(xml.as_slice()).map_err(|err| SourceError::open(&self.path, err)),
            None => Ok(HashMap::new()),
        }
    }
}

/// Pairs a decoded cell with its display format and the text that format shows.
fn formatted(cell: &Data, format: &str, dates: &mut DateRenderer) -> FormattedCell {
    if is_empty(cell) {
        return FormattedCell::plain("");
    }
    // Typed dates under a style without date tokens still render as dates.
    let format = if !is_date_format(format) && typed_date_time(cell).is_some() {
        DATE_TIME_FORMAT
    } else {
        format
    };
    if is_date_format(format) {
        if let Some(text) = date_time_value(cell).and_then(|value| dates.display(value, format)) {
            return FormattedCell::new(format, text);
        }
    }
    FormattedCell::new(format, cell_text(cell))
}

impl ModernWorkbook for CalamineXlsx {
    fn sheet_count(&self) -> usize {
        self.workbook.sheet_names().len()
    }

    fn sheet(&mut self, index: usize) -> SourceResult<ModernSheet> {
        let range = match self.workbook.worksheet_range_at(index) {
            Some(range) => range.map_err(|err| SourceError::open(&self.path, err))?,
            None => return Err(SourceError::InvalidFormat(format!("no sheet {index} available"))),
        };
        let styles = self.styles_of(index)?;
        let Some((first_row, first_col)) = range.start() else {
            return Ok(ModernSheet::default());
        };

        // Rows above and columns left of the used range are not part of it.
        let mut dates = DateRenderer::new();
        let mut rows = vec![None; first_row as usize];
        for (row, cells) in (first_row..).zip(range.rows()) {
            if cells.iter().all(is_empty) {
                rows.push(None);
                continue;
            }
            let mut values = vec![FormattedCell::plain(""); first_col as usize];
            for (col, cell) in (first_col..).zip(cells) {
                let style = styles.get(&(row, col)).copied().unwrap_or(0);
                values.push(formatted(cell, self.formats.format(style), &mut dates));
            }
            rows.push(Some(values));
        }
        Ok(ModernSheet { rows })
    }
}
