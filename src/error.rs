use reqwest::StatusCode;
use snafu::Snafu;

pub type GinghamResult<T> = Result<T, GinghamError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GinghamError {
    #[snafu(display("Unable to parse sheet URL {:?}", url))]
    ParseSheetUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Error fetching sheet CSV"))]
    FetchSheet { source: reqwest::Error },
    #[snafu(display("Failed to fetch CSV: {}", status))]
    SheetStatus { status: StatusCode },
    #[snafu(display(
        "התקבל דף התחברות במקום נתונים. נא לוודא שהקובץ מוגדר כ-Public או Anyone with the link."
    ))]
    HtmlSheet,
    #[snafu(display("Error reading sheet response body"))]
    ReadSheetBody { source: reqwest::Error },
    #[snafu(display("Error with CSVs"))]
    Csv { source: csv::Error },
}
