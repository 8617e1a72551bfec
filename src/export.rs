//! Writing a filtered view as CSV or Excel.

use crate::dataset::{Field, Layout};
use crate::errors::Result;
use crate::filter::View;
use crate::input::Review;
use crate::output::{self, Export};
use itertools::Itertools;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Name of the downloadable CSV file.
pub const EXPORT_FILENAME: &str = "filtered_reviews.csv";

pub const EXCEL_FILENAME: &str = "filtered_reviews.xlsx";

const COL_SENTIMENT: &str = "Sentiment";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Input columns in input order, then the derived label.
fn header(layout: &Layout) -> Vec<&str> {
    let mut h = layout.fields().iter().map(|&f| layout.name(f)).collect_vec();
    h.push(COL_SENTIMENT);
    h
}

fn cell(review: &Review, field: Field) -> String {
    match field {
        Field::Reviewer => review.reviewer().unwrap_or_default().to_owned(),
        Field::Restaurant => review.restaurant().unwrap_or_default().to_owned(),
        Field::Rating => output::pretty_rating(review.rating()),
        Field::Time => review.time().format(TIME_FORMAT).to_string(),
        Field::Review => review.text().to_owned(),
        Field::Extra(i) => review.extra().get(i).cloned().unwrap_or_default(),
    }
}

fn row(layout: &Layout, review: &Review) -> Vec<String> {
    let mut r = layout.fields().iter().map(|&f| cell(review, f)).collect_vec();
    r.push(review.sentiment().to_string());
    r
}

pub fn to_csv(layout: &Layout, view: &View) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(header(layout))?;
    for review in view.iter() {
        writer.write_record(row(layout, review))?;
    }
    Ok(writer.into_inner()?)
}

pub fn export(layout: &Layout, view: &View) -> Result<Export> {
    let csv = String::from_utf8(to_csv(layout, view)?)?;
    Ok(Export {
        filename: EXPORT_FILENAME.to_owned(),
        csv,
    })
}

fn workbook(layout: &Layout, view: &View) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Reviews")?;
    for (col, h) in header(layout).into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, h, &bold)?;
    }
    let rating_col = layout.fields().iter().position(|&f| f == Field::Rating);
    for (i, review) in view.iter().enumerate() {
        let line = (i + 1) as u32;
        for (col, value) in row(layout, review).iter().enumerate() {
            if Some(col) == rating_col {
                sheet.write_number(line, col as u16, review.rating())?;
            } else {
                sheet.write_string(line, col as u16, value)?;
            }
        }
    }
    Ok(workbook)
}

pub fn to_xlsx(layout: &Layout, view: &View) -> Result<Vec<u8>> {
    let mut workbook = workbook(layout, view)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn write_xlsx<P: AsRef<Path>>(layout: &Layout, view: &View, path: P) -> Result<()> {
    let mut workbook = workbook(layout, view)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

/// Column names of an export, for display.
pub fn pretty_header(layout: &Layout) -> String {
    header(layout).iter().join(", ")
}
