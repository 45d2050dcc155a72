/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. One column of every dataframe is the target column, the column a classifier learns to predict.

Dataframes are loaded from delimited text files (see [`load`](load/index.html)) or from attribute-typed ARFF files (see [`arff`](arff/index.html)).
*/

use std::num::NonZeroUsize;

pub mod arff;
mod error;
pub mod load;

pub use self::error::LoadError;
pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
	/// This is the index of the column whose values are being predicted.
	pub target_column_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrameView<'a> {
	pub columns: Vec<ColumnView<'a>>,
	pub target_column_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

/// Invalid values in a number column are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// The values of an enum column are 1-based indexes into `options`, or `None` if the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnView<'a> {
	Unknown(UnknownColumnView<'a>),
	Number(NumberColumnView<'a>),
	Enum(EnumColumnView<'a>),
	Text(TextColumnView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumnView<'a> {
	pub name: &'a str,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumnView<'a> {
	pub name: &'a str,
	pub options: &'a [String],
	pub data: &'a [Option<NonZeroUsize>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

impl DataFrame {
	/// Create an empty dataframe. The target column defaults to the last column.
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns: Vec<Column> = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		let target_column_index = columns.len().saturating_sub(1);
		Self {
			columns,
			target_column_index,
		}
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn target_column(&self) -> Option<&Column> {
		self.columns.get(self.target_column_index)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn view(&self) -> DataFrameView {
		let columns = self.columns.iter().map(|column| column.view()).collect();
		DataFrameView {
			columns,
			target_column_index: self.target_column_index,
		}
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumn> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn view(&self) -> ColumnView {
		match self {
			Self::Unknown(column) => ColumnView::Unknown(column.view()),
			Self::Number(column) => ColumnView::Number(column.view()),
			Self::Enum(column) => ColumnView::Enum(column.view()),
			Self::Text(column) => ColumnView::Text(column.view()),
		}
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}

	pub fn view(&self) -> UnknownColumnView {
		UnknownColumnView {
			name: &self.name,
			len: self.len,
		}
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> NumberColumnView {
		NumberColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	/// Look up the 1-based index of `value` among this column's options.
	pub fn option_index(&self, value: &str) -> Option<NonZeroUsize> {
		self.options
			.iter()
			.position(|option| option == value)
			.and_then(|position| NonZeroUsize::new(position + 1))
	}

	pub fn view(&self) -> EnumColumnView {
		EnumColumnView {
			name: &self.name,
			data: &self.data,
			options: &self.options,
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> TextColumnView {
		TextColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl<'a> DataFrameView<'a> {
	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn target_column(&self) -> Option<&ColumnView<'a>> {
		self.columns.get(self.target_column_index)
	}

	pub fn view(&self) -> Self {
		self.clone()
	}

	/// Split the view into the rows before `index` and the rows from `index` on. Both halves keep the column types, enum options, and target column of the whole.
	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		let mut columns_a = Vec::with_capacity(self.columns.len());
		let mut columns_b = Vec::with_capacity(self.columns.len());
		for column in self.columns.iter() {
			let (column_a, column_b) = column.split_at_row(index);
			columns_a.push(column_a);
			columns_b.push(column_b);
		}
		(
			Self {
				columns: columns_a,
				target_column_index: self.target_column_index,
			},
			Self {
				columns: columns_b,
				target_column_index: self.target_column_index,
			},
		)
	}
}

impl<'a> ColumnView<'a> {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &'a str {
		match self {
			Self::Unknown(s) => s.name,
			Self::Number(s) => s.name,
			Self::Enum(s) => s.name,
			Self::Text(s) => s.name,
		}
	}

	pub fn as_number(&self) -> Option<NumberColumnView<'a>> {
		match self {
			Self::Number(s) => Some(s.clone()),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<EnumColumnView<'a>> {
		match self {
			Self::Enum(s) => Some(s.clone()),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<TextColumnView<'a>> {
		match self {
			Self::Text(s) => Some(s.clone()),
			_ => None,
		}
	}

	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		match self {
			ColumnView::Unknown(column) => (
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: index,
				}),
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: column.len - index,
				}),
			),
			ColumnView::Number(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
			ColumnView::Enum(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_a,
					}),
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_b,
					}),
				)
			}
			ColumnView::Text(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn dataframe() -> DataFrame {
		let mut dataframe = DataFrame::new(
			vec!["x".to_owned(), "class".to_owned()],
			vec![
				ColumnType::Number,
				ColumnType::Enum {
					options: vec!["a".to_owned(), "b".to_owned()],
				},
			],
		);
		if let Column::Number(column) = &mut dataframe.columns[0] {
			column.data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
		}
		if let Column::Enum(column) = &mut dataframe.columns[1] {
			column.data = [1, 2, 1, 2, 2]
				.iter()
				.map(|index| NonZeroUsize::new(*index))
				.collect();
		}
		dataframe
	}

	#[test]
	fn test_target_defaults_to_last_column() {
		let dataframe = dataframe();
		assert_eq!(dataframe.target_column_index, 1);
		assert_eq!(dataframe.target_column().unwrap().name(), "class");
	}

	#[test]
	fn test_split_at_row_keeps_order() {
		let dataframe = dataframe();
		let (train, test) = dataframe.view().split_at_row(3);
		assert_eq!(train.nrows(), 3);
		assert_eq!(test.nrows(), 2);
		assert_eq!(train.columns[0].as_number().unwrap().data, &[1.0, 2.0, 3.0]);
		assert_eq!(test.columns[0].as_number().unwrap().data, &[4.0, 5.0]);
		assert_eq!(test.target_column_index, 1);
		assert_eq!(test.columns[1].as_enum().unwrap().options.len(), 2);
	}

	#[test]
	fn test_split_at_ends() {
		let dataframe = dataframe();
		let (train, test) = dataframe.view().split_at_row(0);
		assert_eq!(train.nrows(), 0);
		assert_eq!(test.nrows(), 5);
		let (train, test) = dataframe.view().split_at_row(5);
		assert_eq!(train.nrows(), 5);
		assert_eq!(test.nrows(), 0);
	}
}
