//! Data providers: the only place cell values live.

use std::fmt;
use std::sync::Arc;

use nattable_core::CellValue;

use crate::list::FilterList;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    OutOfBounds { column: usize, row: usize },
    /// The column cannot be written.
    ReadOnly { column: usize },
    /// The provider only accepts values of one type in this column.
    TypeMismatch { column: usize, expected: &'static str, found: &'static str },
    /// Provider-specific rejection.
    Rejected(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { column, row } => write!(f, "cell ({column}, {row}) is out of bounds"),
            Self::ReadOnly { column } => write!(f, "column {column} is read-only"),
            Self::TypeMismatch { column, expected, found } => {
                write!(f, "column {column} expects {expected}, got {found}")
            }
            Self::Rejected(msg) => write!(f, "value rejected: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

/// Index-based cell access for the base data layer.
pub trait DataProvider {
    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    /// `CellValue::Null` outside the bounds.
    fn data_value(&self, column: usize, row: usize) -> CellValue;

    fn set_data_value(&mut self, column: usize, row: usize, value: CellValue) -> Result<(), DataError>;
}

/// Row-major in-memory table.
#[derive(Debug, Clone, Default)]
pub struct VecDataProvider {
    columns: usize,
    rows: Vec<Vec<CellValue>>,
}

impl VecDataProvider {
    /// Short rows are padded with nulls to the widest row.
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(columns, CellValue::Null);
        }
        Self { columns, rows }
    }

    pub fn with_size(columns: usize, rows: usize) -> Self {
        Self { columns, rows: vec![vec![CellValue::Null; columns]; rows] }
    }

    /// Each cell holds `column * 10 + row` as an `Int`.
    pub fn numbered(columns: usize, rows: usize) -> Self {
        let rows = (0..rows)
            .map(|r| (0..columns).map(|c| CellValue::Int((c * 10 + r) as i32)).collect())
            .collect();
        Self { columns, rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

impl DataProvider for VecDataProvider {
    fn column_count(&self) -> usize {
        self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn data_value(&self, column: usize, row: usize) -> CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn set_data_value(&mut self, column: usize, row: usize, value: CellValue) -> Result<(), DataError> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(DataError::OutOfBounds { column, row })?;
        *cell = value;
        Ok(())
    }
}

/// Reads and writes the columns of one row object.
pub trait ColumnAccessor<T>: Send + Sync {
    fn column_count(&self) -> usize;

    fn data_value(&self, item: &T, column: usize) -> CellValue;

    fn set_data_value(&self, _item: &mut T, column: usize, _value: CellValue) -> Result<(), DataError> {
        Err(DataError::ReadOnly { column })
    }
}

impl<T, A: ColumnAccessor<T> + ?Sized> ColumnAccessor<T> for Arc<A> {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn data_value(&self, item: &T, column: usize) -> CellValue {
        (**self).data_value(item, column)
    }

    fn set_data_value(&self, item: &mut T, column: usize, value: CellValue) -> Result<(), DataError> {
        (**self).set_data_value(item, column, value)
    }
}

/// Row objects: one row per item of a filtered list.
pub struct ListDataProvider<T, A> {
    list: FilterList<T>,
    accessor: A,
}

impl<T, A: ColumnAccessor<T>> ListDataProvider<T, A> {
    pub fn new(list: FilterList<T>, accessor: A) -> Self {
        Self { list, accessor }
    }

    pub fn list(&self) -> &FilterList<T> {
        &self.list
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }
}

impl<T, A: ColumnAccessor<T>> DataProvider for ListDataProvider<T, A> {
    fn column_count(&self) -> usize {
        self.accessor.column_count()
    }

    fn row_count(&self) -> usize {
        self.list.len()
    }

    fn data_value(&self, column: usize, row: usize) -> CellValue {
        if column >= self.accessor.column_count() {
            return CellValue::Null;
        }
        self.list
            .with_item(row, |item| self.accessor.data_value(item, column))
            .unwrap_or_default()
    }

    fn set_data_value(&mut self, column: usize, row: usize, value: CellValue) -> Result<(), DataError> {
        if column >= self.accessor.column_count() {
            return Err(DataError::OutOfBounds { column, row });
        }
        let accessor = &self.accessor;
        self.list
            .update_item(row, |item| accessor.set_data_value(item, column, value))
            .unwrap_or(Err(DataError::OutOfBounds { column, row }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::EventList;

    struct Pair;

    impl ColumnAccessor<(String, i64)> for Pair {
        fn column_count(&self) -> usize {
            2
        }

        fn data_value(&self, item: &(String, i64), column: usize) -> CellValue {
            match column {
                0 => CellValue::Text(item.0.clone()),
                _ => CellValue::Long(item.1),
            }
        }

        fn set_data_value(&self, item: &mut (String, i64), column: usize, value: CellValue) -> Result<(), DataError> {
            match (column, value) {
                (1, CellValue::Long(v)) => {
                    item.1 = v;
                    Ok(())
                }
                (1, other) => Err(DataError::TypeMismatch { column, expected: "long", found: other.type_name() }),
                _ => Err(DataError::ReadOnly { column }),
            }
        }
    }

    #[test]
    fn test_vec_provider_pads_and_bounds() {
        let mut provider = VecDataProvider::new(vec![vec![1.into()], vec![2.into(), 3.into()]]);
        assert_eq!(provider.column_count(), 2);
        assert_eq!(provider.data_value(1, 0), CellValue::Null);
        assert_eq!(provider.data_value(5, 5), CellValue::Null);
        assert_eq!(
            provider.set_data_value(2, 0, CellValue::Null),
            Err(DataError::OutOfBounds { column: 2, row: 0 })
        );
    }

    #[test]
    fn test_list_provider_reads_through_accessor() {
        let list = EventList::new(vec![("a".to_string(), 1), ("b".to_string(), 2)]);
        let mut provider = ListDataProvider::new(list.filter_list(), Pair);
        assert_eq!(provider.row_count(), 2);
        assert_eq!(provider.data_value(0, 1), CellValue::Text("b".into()));

        provider.set_data_value(1, 0, CellValue::Long(9)).unwrap();
        assert_eq!(list.get(0), Some(("a".to_string(), 9)));
        assert!(matches!(provider.set_data_value(0, 0, "x".into()), Err(DataError::ReadOnly { .. })));
        assert!(matches!(
            provider.set_data_value(1, 0, CellValue::Int(1)),
            Err(DataError::TypeMismatch { .. })
        ));
    }
}
