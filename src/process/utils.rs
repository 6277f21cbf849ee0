use arrow::datatypes::DataType;

/// Infer the Arrow dtype of a text column: `Float64` when every present cell
/// is a number (and there is at least one), otherwise `Utf8`.
pub fn infer_column_dtype<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut any = false;
    for cell in cells.into_iter().flatten() {
        if cell.parse::<f64>().is_err() {
            return DataType::Utf8;
        }
        any = true;
    }
    if any {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_only_when_every_cell_parses() {
        assert_eq!(
            infer_column_dtype([Some("1.5"), None, Some("-2e3")]),
            DataType::Float64
        );
        assert_eq!(infer_column_dtype([Some("1.5"), Some("x")]), DataType::Utf8);
        assert_eq!(infer_column_dtype([None, None]), DataType::Utf8);
    }
}
