/*!
This module loads a [`DataFrame`](../struct.DataFrame.html) from a file on disk. Delimited text files have their column types inferred with a first pass over the file, ARFF files declare them.
*/

use super::*;
use itertools::izip;
use std::{
	collections::{BTreeMap, BTreeSet},
	fs::File,
	io::{BufRead, BufReader},
	path::Path,
};

#[derive(Clone)]
pub struct LoadOptions<'a> {
	/// Column types given here skip inference for the named columns.
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub infer_options: InferOptions,
	pub invalid_values: &'a [&'a str],
	/// The name of the column to predict. If it is `None`, the last column is the target.
	pub target_column: Option<String>,
}

impl<'a> Default for LoadOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			infer_options: InferOptions::default(),
			invalid_values: DEFAULT_INVALID_VALUES,
			target_column: None,
		}
	}
}

#[derive(Clone, Debug)]
pub struct InferOptions {
	pub enum_max_unique_values: usize,
}

impl Default for InferOptions {
	fn default() -> Self {
		Self {
			enum_max_unique_values: 100,
		}
	}
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FileFormat {
	Delimited { delimiter: u8 },
	Arff,
}

impl FileFormat {
	/// Choose the format by file extension, falling back to sniffing the file's contents.
	pub fn from_path(path: &Path) -> Result<Self, LoadError> {
		let extension = path
			.extension()
			.and_then(|extension| extension.to_str())
			.map(|extension| extension.to_ascii_lowercase());
		match extension.as_deref() {
			Some("arff") => Ok(FileFormat::Arff),
			Some("csv") => Ok(FileFormat::Delimited { delimiter: b',' }),
			Some("tsv") | Some("tab") => Ok(FileFormat::Delimited { delimiter: b'\t' }),
			_ => {
				let file = open(path)?;
				Self::sniff(BufReader::new(file)).map_err(|source| LoadError::Io {
					path: path.to_owned(),
					source,
				})
			}
		}
	}

	/// A file whose first meaningful line is an `@relation` declaration is ARFF. Anything else is treated as comma delimited.
	pub fn sniff(reader: impl BufRead) -> std::io::Result<Self> {
		for line in reader.lines() {
			let line = line?;
			let line = line.trim();
			if line.is_empty() || line.starts_with('%') {
				continue;
			}
			let is_arff = line
				.get(..9)
				.map(|prefix| prefix.eq_ignore_ascii_case("@relation"))
				.unwrap_or(false);
			return Ok(if is_arff {
				FileFormat::Arff
			} else {
				FileFormat::Delimited { delimiter: b',' }
			});
		}
		Ok(FileFormat::Delimited { delimiter: b',' })
	}
}

pub(crate) fn open(path: &Path) -> Result<File, LoadError> {
	File::open(path).map_err(|source| LoadError::Io {
		path: path.to_owned(),
		source,
	})
}

/// Find the index of the target column, which is the last column unless one was named.
pub(crate) fn find_target_column(
	column_names: &[String],
	target_column: Option<&str>,
) -> Result<usize, LoadError> {
	if column_names.is_empty() {
		return Err(LoadError::NoColumns);
	}
	match target_column {
		None => Ok(column_names.len() - 1),
		Some(target) => column_names
			.iter()
			.position(|column_name| column_name == target)
			.ok_or_else(|| LoadError::TargetNotFound {
				target: target.to_owned(),
				column_names: column_names.join(", "),
			}),
	}
}

impl DataFrame {
	pub fn from_path(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
		match FileFormat::from_path(path)? {
			FileFormat::Delimited { delimiter } => {
				let file = open(path)?;
				let mut reader = csv::ReaderBuilder::new()
					.delimiter(delimiter)
					.trim(csv::Trim::All)
					.from_reader(file);
				Self::from_csv(&mut reader, options)
			}
			FileFormat::Arff => {
				let file = open(path)?;
				Self::from_arff(BufReader::new(file), options)
			}
		}
	}

	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: &LoadOptions) -> Result<Self, LoadError>
	where
		R: std::io::Read + std::io::Seek,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let target_column_index =
			find_target_column(&column_names, options.target_column.as_deref())?;
		let start_position = reader.position().clone();
		let infer_options = &options.infer_options;
		let mut n_rows = None;

		#[derive(Clone, Debug)]
		enum ColumnTypeOrInferStats<'a> {
			ColumnType(ColumnType),
			InferStats(InferStats<'a>),
		}

		// Retrieve any column types present in the options.
		let mut column_types: Vec<ColumnTypeOrInferStats> = column_names
			.iter()
			.enumerate()
			.map(|(column_index, column_name)| {
				options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(column_name))
					.map(|column_type| ColumnTypeOrInferStats::ColumnType(column_type.clone()))
					.unwrap_or_else(|| {
						ColumnTypeOrInferStats::InferStats(InferStats::new(
							infer_options,
							options.invalid_values,
							column_index == target_column_index,
						))
					})
			})
			.collect();

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer = column_types.iter().any(|column_type_or_infer_stats| {
			matches!(
				column_type_or_infer_stats,
				ColumnTypeOrInferStats::InferStats(_)
			)
		});

		// If the infer pass is necessary, pass over the dataset and infer the types for those columns whose types were not specified.
		if needs_infer {
			let mut infer_stats: Vec<(usize, &mut InferStats)> = column_types
				.iter_mut()
				.enumerate()
				.filter_map(
					|(index, column_type_or_infer_stats)| match column_type_or_infer_stats {
						ColumnTypeOrInferStats::ColumnType(_) => None,
						ColumnTypeOrInferStats::InferStats(infer_stats) => {
							Some((index, infer_stats))
						}
					},
				)
				.collect();
			// Iterate over each record in the csv file and update the infer stats for the columns that need to be inferred.
			let mut record = csv::StringRecord::new();
			let mut n_rows_computed = 0;
			while reader.read_record(&mut record)? {
				n_rows_computed += 1;
				for (index, infer_stats) in infer_stats.iter_mut() {
					if let Some(value) = record.get(*index) {
						infer_stats.update(value);
					}
				}
			}
			n_rows = Some(n_rows_computed);
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
		}
		let column_types: Vec<ColumnType> = column_types
			.into_iter()
			.map(
				|column_type_or_infer_stats| match column_type_or_infer_stats {
					ColumnTypeOrInferStats::ColumnType(column_type) => column_type,
					ColumnTypeOrInferStats::InferStats(infer_stats) => infer_stats.finalize(),
				},
			)
			.collect();

		// Create the dataframe.
		let mut dataframe = Self::new(column_names, column_types);
		dataframe.target_column_index = target_column_index;
		// If an inference pass was done, reserve storage for the values because we know how many rows are in the csv.
		if let Some(n_rows) = n_rows {
			for column in dataframe.columns.iter_mut() {
				match column {
					Column::Unknown(_) => {}
					Column::Number(column) => column.data.reserve_exact(n_rows),
					Column::Enum(column) => column.data.reserve_exact(n_rows),
					Column::Text(column) => column.data.reserve_exact(n_rows),
				}
			}
		}
		let enum_option_indexes: Vec<Option<BTreeMap<String, NonZeroUsize>>> = dataframe
			.columns
			.iter()
			.map(|column| {
				column.as_enum().map(|column| {
					column
						.options
						.iter()
						.enumerate()
						.filter_map(|(position, option)| {
							NonZeroUsize::new(position + 1).map(|index| (option.clone(), index))
						})
						.collect()
				})
			})
			.collect();
		// Read each csv record and insert the values into the columns of the dataframe.
		let mut record = csv::ByteRecord::new();
		while reader.read_byte_record(&mut record)? {
			for (column, option_indexes, value) in izip!(
				dataframe.columns.iter_mut(),
				enum_option_indexes.iter(),
				record.iter(),
			) {
				match column {
					Column::Unknown(column) => {
						column.len += 1;
					}
					Column::Number(column) => {
						let value = match lexical::parse::<f32, &[u8]>(value) {
							Ok(value) if value.is_finite() => value,
							_ => std::f32::NAN,
						};
						column.data.push(value);
					}
					Column::Enum(column) => {
						let value = std::str::from_utf8(value).ok().and_then(|value| {
							option_indexes
								.as_ref()
								.and_then(|option_indexes| option_indexes.get(value).copied())
						});
						column.data.push(value);
					}
					Column::Text(column) => {
						column.data.push(String::from_utf8_lossy(value).into_owned())
					}
				}
			}
		}
		if dataframe.nrows() == 0 {
			return Err(LoadError::Empty);
		}
		Ok(dataframe)
	}
}

#[derive(Clone, Debug)]
pub struct InferStats<'a> {
	infer_options: &'a InferOptions,
	invalid_values: &'a [&'a str],
	is_target: bool,
	column_type: InferColumnType,
	unique_values: Option<BTreeSet<String>>,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Enum,
	Text,
}

impl<'a> InferStats<'a> {
	pub fn new(
		infer_options: &'a InferOptions,
		invalid_values: &'a [&'a str],
		is_target: bool,
	) -> Self {
		Self {
			infer_options,
			invalid_values,
			is_target,
			column_type: InferColumnType::Unknown,
			unique_values: Some(BTreeSet::new()),
		}
	}

	pub fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		if let Some(unique_values) = self.unique_values.as_mut() {
			if !unique_values.contains(value) {
				unique_values.insert(value.to_owned());
			}
			if unique_values.len() > self.infer_options.enum_max_unique_values {
				self.unique_values = None;
			}
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				if lexical::parse::<f32, &str>(value)
					.map(|v| v.is_finite())
					.unwrap_or(false)
				{
					self.column_type = InferColumnType::Number;
				} else if self.unique_values.is_some() {
					self.column_type = InferColumnType::Enum;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Enum => {
				if self.unique_values.is_none() {
					self.column_type = InferColumnType::Text;
				}
			}
			_ => {}
		}
	}

	pub fn finalize(self) -> ColumnType {
		match self.column_type {
			InferColumnType::Unknown => ColumnType::Unknown,
			InferColumnType::Number => {
				if let Some(unique_values) = self.unique_values {
					// Class labels are nominal even when they look like numbers.
					if self.is_target {
						return ColumnType::Enum {
							options: sort_numerically(unique_values),
						};
					}
					// If all the values in a number column are zero or one then make this an enum column instead.
					let mut values = unique_values.iter();
					if values.next().map(|s| s.as_str()) == Some("0")
						&& values.next().map(|s| s.as_str()) == Some("1")
						&& values.next().is_none()
					{
						return ColumnType::Enum {
							options: unique_values.into_iter().collect(),
						};
					}
				}
				ColumnType::Number
			}
			InferColumnType::Enum => match self.unique_values {
				Some(unique_values) => ColumnType::Enum {
					options: unique_values.into_iter().collect(),
				},
				None => ColumnType::Text,
			},
			InferColumnType::Text => ColumnType::Text,
		}
	}
}

fn sort_numerically(values: BTreeSet<String>) -> Vec<String> {
	let mut values: Vec<(f32, String)> = values
		.into_iter()
		.map(|value| {
			let number = lexical::parse::<f32, &str>(&value).unwrap_or(std::f32::NAN);
			(number, value)
		})
		.collect();
	values.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
	values.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
fn load_csv(csv: &str, options: &LoadOptions) -> Result<DataFrame, LoadError> {
	DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		options,
	)
}

#[test]
fn test_infer() {
	let csv = r#"number,enum,text
1,test,hello
2,test,world
"#;
	let df = load_csv(
		csv,
		&LoadOptions {
			infer_options: InferOptions {
				enum_max_unique_values: 1,
			},
			..Default::default()
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "number",
                 data: [
                     1.0,
                     2.0,
                 ],
             },
         ),
         Enum(
             EnumColumn {
                 name: "enum",
                 options: [
                     "test",
                 ],
                 data: [
                     Some(
                         1,
                     ),
                     Some(
                         1,
                     ),
                 ],
             },
         ),
         Text(
             TextColumn {
                 name: "text",
                 data: [
                     "hello",
                     "world",
                 ],
             },
         ),
     ],
     target_column_index: 2,
 }
 "###);
}

#[test]
fn test_column_types() {
	let csv = r#"number,text,enum
1,test,hello
2,test,world
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("text".to_owned(), ColumnType::Text);
	column_types.insert(
		"enum".to_owned(),
		ColumnType::Enum {
			options: vec!["hello".to_owned(), "world".to_owned()],
		},
	);
	let df = load_csv(
		csv,
		&LoadOptions {
			column_types: Some(column_types),
			infer_options: InferOptions {
				enum_max_unique_values: 2,
			},
			..Default::default()
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "number",
                 data: [
                     1.0,
                     2.0,
                 ],
             },
         ),
         Text(
             TextColumn {
                 name: "text",
                 data: [
                     "test",
                     "test",
                 ],
             },
         ),
         Enum(
             EnumColumn {
                 name: "enum",
                 options: [
                     "hello",
                     "world",
                 ],
                 data: [
                     Some(
                         1,
                     ),
                     Some(
                         2,
                     ),
                 ],
             },
         ),
     ],
     target_column_index: 2,
 }
 "###);
}

#[test]
fn test_numeric_target_is_inferred_as_enum() {
	let csv = "x,label\n0.5,10\n1.5,2\n2.5,10\n3.5,?\n";
	let df = load_csv(csv, &LoadOptions::default()).unwrap();
	let label = df.columns[1].as_enum().unwrap();
	assert_eq!(label.options, vec!["2".to_owned(), "10".to_owned()]);
	assert_eq!(
		label.data,
		vec![
			NonZeroUsize::new(2),
			NonZeroUsize::new(1),
			NonZeroUsize::new(2),
			None
		]
	);
	assert!(df.columns[0].as_number().is_some());
}

#[test]
fn test_missing_numbers_are_nan() {
	let csv = "x,y,label\n1,?,a\n,2,b\n";
	let df = load_csv(csv, &LoadOptions::default()).unwrap();
	let x = df.columns[0].as_number().unwrap();
	assert_eq!(x.data[0], 1.0);
	assert!(x.data[1].is_nan());
	let y = df.columns[1].as_number().unwrap();
	assert!(y.data[0].is_nan());
}

#[test]
fn test_named_target_column() {
	let csv = "label,x\na,1\nb,2\n";
	let df = load_csv(
		csv,
		&LoadOptions {
			target_column: Some("label".to_owned()),
			..Default::default()
		},
	)
	.unwrap();
	assert_eq!(df.target_column_index, 0);
	let error = load_csv(
		csv,
		&LoadOptions {
			target_column: Some("species".to_owned()),
			..Default::default()
		},
	)
	.unwrap_err();
	assert!(matches!(error, LoadError::TargetNotFound { .. }));
}

#[test]
fn test_header_only_is_empty() {
	let error = load_csv("a,b\n", &LoadOptions::default()).unwrap_err();
	assert!(matches!(error, LoadError::Empty));
	let error = load_csv("", &LoadOptions::default()).unwrap_err();
	assert!(matches!(error, LoadError::NoColumns));
}

#[test]
fn test_ragged_rows_are_malformed() {
	let error = load_csv("a,b\n1,2\n3\n", &LoadOptions::default()).unwrap_err();
	assert!(matches!(error, LoadError::Csv(_)));
}

#[test]
fn test_sniff() {
	let arff = "% comment\n\n@RELATION iris\n@attribute a numeric\n";
	assert_eq!(
		FileFormat::sniff(std::io::Cursor::new(arff)).unwrap(),
		FileFormat::Arff
	);
	let csv = "a,b\n1,2\n";
	assert_eq!(
		FileFormat::sniff(std::io::Cursor::new(csv)).unwrap(),
		FileFormat::Delimited { delimiter: b',' }
	);
}

#[test]
fn test_from_path_missing_file() {
	let error = DataFrame::from_path(
		Path::new("/this/file/does/not/exist.csv"),
		&LoadOptions::default(),
	)
	.unwrap_err();
	assert!(matches!(error, LoadError::Io { .. }));
}

#[test]
fn test_from_path_tsv() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("data.tsv");
	std::fs::write(&path, "x\tclass\n1\tyes\n2\tno\n").unwrap();
	let df = DataFrame::from_path(&path, &LoadOptions::default()).unwrap();
	assert_eq!(df.nrows(), 2);
	assert_eq!(
		df.columns[1].as_enum().unwrap().options,
		vec!["no".to_owned(), "yes".to_owned()]
	);
}
