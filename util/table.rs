use itertools::izip;
use ndarray::prelude::*;

/**
A `Table` renders a grid of cells as plain text, with an optional header row separated from the values by a line of dashes.

```
use ndarray::prelude::*;
use suinz_util::table::{Alignment, Table};

let header = ["Name".to_owned(), "Value".to_owned()];
let values = arr2(&[["a".to_owned(), "1".to_owned()]]);
let table = Table::new()
	.header(&header)
	.values(values.view())
	.alignments(&[Alignment::Left, Alignment::Right]);
assert_eq!(table.to_string(), "| Name | Value |\n|------|-------|\n| a    |     1 |\n");
```
*/
pub struct Table<'a> {
	padding: usize,
	header: Option<&'a [String]>,
	values: Option<ArrayView2<'a, String>>,
	alignments: Option<&'a [Alignment]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
	Left,
	Right,
}

impl<'a> Default for Table<'a> {
	fn default() -> Self {
		Self {
			padding: 1,
			header: None,
			values: None,
			alignments: None,
		}
	}
}

impl<'a> Table<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn header(mut self, header: &'a [String]) -> Self {
		self.header = Some(header);
		self
	}

	pub fn values(mut self, values: ArrayView2<'a, String>) -> Self {
		self.values = Some(values);
		self
	}

	/// Columns without an entry in `alignments` are left aligned.
	pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
		self.alignments = Some(alignments);
		self
	}

	fn alignment(&self, column_index: usize) -> Alignment {
		self.alignments
			.and_then(|alignments| alignments.get(column_index).copied())
			.unwrap_or(Alignment::Left)
	}
}

impl<'a> std::fmt::Display for Table<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let n_columns = None
			.or_else(|| self.header.map(|header| header.len()))
			.or_else(|| self.values.as_ref().map(|values| values.ncols()))
			.unwrap_or(0);
		let mut column_widths: Vec<usize> = vec![0; n_columns];
		// update column widths with header
		if let Some(header) = self.header {
			for (column_width, header) in izip!(column_widths.iter_mut(), header) {
				*column_width = header.chars().count();
			}
		}
		// update column widths with values
		if let Some(values) = self.values.as_ref() {
			for (column_width, column) in izip!(column_widths.iter_mut(), values.gencolumns()) {
				for value in column.iter() {
					*column_width = usize::max(*column_width, value.chars().count());
				}
			}
		}
		let alignments: Vec<Alignment> = (0..n_columns).map(|i| self.alignment(i)).collect();
		// write header
		if let Some(header) = self.header {
			let row = Row {
				column_widths: &column_widths,
				alignments: &alignments,
				padding: self.padding,
				values: header.iter().map(|value| value.as_str()).collect(),
			};
			writeln!(f, "{}", row)?;
			let line = Line {
				column_widths: &column_widths,
				padding: self.padding,
			};
			writeln!(f, "{}", line)?;
		}
		// write values
		if let Some(values) = self.values.as_ref() {
			for values in values.genrows() {
				let row = Row {
					column_widths: &column_widths,
					alignments: &alignments,
					padding: self.padding,
					values: values.iter().map(|value| value.as_str()).collect(),
				};
				writeln!(f, "{}", row)?;
			}
		}
		Ok(())
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
	padding: usize,
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			for _ in 0..column_width + 2 * self.padding {
				write!(f, "-")?;
			}
			write!(f, "|")?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	alignments: &'a [Alignment],
	padding: usize,
	values: Vec<&'a str>,
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, alignment, value) in
			izip!(self.column_widths, self.alignments, self.values.iter())
		{
			let fill = column_width - value.chars().count();
			let (left, right) = match alignment {
				Alignment::Left => (self.padding, fill + self.padding),
				Alignment::Right => (fill + self.padding, self.padding),
			};
			for _ in 0..left {
				write!(f, " ")?;
			}
			write!(f, "{}", value)?;
			for _ in 0..right {
				write!(f, " ")?;
			}
			write!(f, "|")?;
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let header = vec!["Metric".to_owned(), "Value".to_owned()];
	let values = arr2(&[
		["Accuracy".to_owned(), "0.9".to_owned()],
		["Kappa".to_owned(), "0.85".to_owned()],
	]);
	let alignments = [Alignment::Left, Alignment::Right];
	let table = Table::new()
		.header(&header)
		.values(values.view())
		.alignments(&alignments);
	insta::assert_snapshot!(table.to_string(), @r###"
 | Metric   | Value |
 |----------|-------|
 | Accuracy |   0.9 |
 | Kappa    |  0.85 |
 "###);
}

#[test]
fn test_table_without_header() {
	let values = arr2(&[["a".to_owned(), "b".to_owned()]]);
	let table = Table::new().values(values.view());
	assert_eq!(table.to_string(), "| a | b |\n");
}
