/*!
This module reads ARFF files, the attribute-relation format where a header declares each attribute's type ahead of the data section.

```text
% comments start with a percent sign
@relation weather
@attribute outlook {sunny, overcast, rainy}
@attribute temperature numeric
@attribute play {yes, no}
@data
sunny,85,no
overcast,?,yes
{1 70, 2 yes}
```

Numeric, real, and integer attributes become number columns. Nominal attributes become enum columns with their options in declaration order. String and date attributes become text columns. A `?` value is missing. Rows in braces are sparse: omitted numeric values are zero and omitted nominal values are the first option.
*/

use super::*;
use std::io::BufRead;

impl DataFrame {
	pub fn from_arff<R: BufRead>(reader: R, options: &LoadOptions) -> Result<Self, LoadError> {
		let mut column_names: Vec<String> = Vec::new();
		let mut column_types: Vec<ColumnType> = Vec::new();
		let mut dataframe: Option<DataFrame> = None;
		for (line_index, line) in reader.lines().enumerate() {
			let line_number = line_index + 1;
			let line = line.map_err(|error| LoadError::arff(line_number, error.to_string()))?;
			let line = line.trim();
			if line.is_empty() || line.starts_with('%') {
				continue;
			}
			match dataframe.as_mut() {
				None => {
					if starts_with_keyword(line, "@relation") {
						continue;
					} else if starts_with_keyword(line, "@attribute") {
						let (name, column_type) = parse_attribute(&line["@attribute".len()..])
							.map_err(|message| LoadError::arff(line_number, message))?;
						column_names.push(name);
						column_types.push(column_type);
					} else if starts_with_keyword(line, "@data") {
						let target_column_index =
							find_target_column(&column_names, options.target_column.as_deref())?;
						let mut new_dataframe = DataFrame::new(
							std::mem::take(&mut column_names),
							std::mem::take(&mut column_types),
						);
						new_dataframe.target_column_index = target_column_index;
						dataframe = Some(new_dataframe);
					} else {
						return Err(LoadError::arff(
							line_number,
							format!("unexpected line in header \"{}\"", line),
						));
					}
				}
				Some(dataframe) => {
					let values = if line.starts_with('{') {
						parse_sparse_row(line, dataframe.ncols())
					} else {
						parse_dense_row(line, dataframe.ncols())
					}
					.map_err(|message| LoadError::arff(line_number, message))?;
					push_row(dataframe, values)
						.map_err(|message| LoadError::arff(line_number, message))?;
				}
			}
		}
		let dataframe = match dataframe {
			Some(dataframe) => dataframe,
			None if column_names.is_empty() => return Err(LoadError::NoColumns),
			None => return Err(LoadError::Empty),
		};
		if dataframe.nrows() == 0 {
			return Err(LoadError::Empty);
		}
		Ok(dataframe)
	}
}

/// A single value from a data row.
#[derive(Clone)]
enum Value {
	Missing,
	/// Left out of a sparse row.
	Omitted,
	Given(String),
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
	line.get(..keyword.len())
		.map(|prefix| prefix.eq_ignore_ascii_case(keyword))
		.unwrap_or(false)
		&& line[keyword.len()..]
			.chars()
			.next()
			.map(|c| c.is_whitespace())
			.unwrap_or(true)
}

fn parse_attribute(rest: &str) -> Result<(String, ColumnType), String> {
	let rest = rest.trim_start();
	let (name, rest) = split_name(rest)?;
	let type_spec = rest.trim();
	if type_spec.starts_with('{') {
		let end = type_spec
			.rfind('}')
			.ok_or_else(|| format!("unterminated nominal specification for \"{}\"", name))?;
		let options = split_top_level(&type_spec[1..end])?
			.into_iter()
			.filter(|option| !option.is_empty())
			.map(|option| unquote(option).0)
			.collect();
		return Ok((name, ColumnType::Enum { options }));
	}
	let keyword = type_spec
		.split_whitespace()
		.next()
		.unwrap_or("")
		.to_ascii_lowercase();
	let column_type = match keyword.as_str() {
		"numeric" | "real" | "integer" => ColumnType::Number,
		"string" | "date" => ColumnType::Text,
		"relational" => return Err("relational attributes are not supported".to_owned()),
		"" => return Err(format!("missing type for attribute \"{}\"", name)),
		_ => return Err(format!("unknown attribute type \"{}\"", type_spec)),
	};
	Ok((name, column_type))
}

/// Split a possibly quoted attribute name off the front of `input`.
fn split_name(input: &str) -> Result<(String, &str), String> {
	let quote = match input.chars().next() {
		Some(quote) if quote == '\'' || quote == '"' => quote,
		Some(_) => {
			let end = input.find(char::is_whitespace).unwrap_or_else(|| input.len());
			return Ok((input[..end].to_owned(), &input[end..]));
		}
		None => return Err("missing attribute name".to_owned()),
	};
	let mut escaped = false;
	for (index, c) in input.char_indices().skip(1) {
		if escaped {
			escaped = false;
		} else if c == '\\' {
			escaped = true;
		} else if c == quote {
			let end = index + c.len_utf8();
			return Ok((unquote(&input[..end]).0, &input[end..]));
		}
	}
	Err("unterminated quoted attribute name".to_owned())
}

/// Split `input` on commas that are not inside quotes. The pieces are trimmed but keep their quotes.
fn split_top_level(input: &str) -> Result<Vec<&str>, String> {
	let mut pieces = Vec::new();
	let mut start = 0;
	let mut quote: Option<char> = None;
	let mut escaped = false;
	for (index, c) in input.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match quote {
			Some(_) if c == '\\' => escaped = true,
			Some(q) if c == q => quote = None,
			Some(_) => {}
			None if c == '\'' || c == '"' => quote = Some(c),
			None if c == ',' => {
				pieces.push(input[start..index].trim());
				start = index + 1;
			}
			None => {}
		}
	}
	if quote.is_some() {
		return Err("unterminated quoted value".to_owned());
	}
	pieces.push(input[start..].trim());
	Ok(pieces)
}

/// Strip surrounding quotes and resolve backslash escapes. The flag is true if the token was quoted.
fn unquote(token: &str) -> (String, bool) {
	let mut chars = token.chars();
	let quote = match chars.next() {
		Some(c) if (c == '\'' || c == '"') && token.len() >= 2 && token.ends_with(c) => c,
		_ => return (token.to_owned(), false),
	};
	let inner = &token[quote.len_utf8()..token.len() - quote.len_utf8()];
	let mut value = String::with_capacity(inner.len());
	let mut inner_chars = inner.chars();
	while let Some(c) = inner_chars.next() {
		if c == '\\' {
			match inner_chars.next() {
				Some('n') => value.push('\n'),
				Some('t') => value.push('\t'),
				Some(escaped) => value.push(escaped),
				None => value.push('\\'),
			}
		} else {
			value.push(c);
		}
	}
	(value, true)
}

fn to_value(token: &str) -> Value {
	let (value, quoted) = unquote(token);
	if !quoted && (value == "?" || value.is_empty()) {
		Value::Missing
	} else {
		Value::Given(value)
	}
}

fn parse_dense_row(line: &str, n_columns: usize) -> Result<Vec<Value>, String> {
	let pieces = split_top_level(line)?;
	if pieces.len() != n_columns {
		return Err(format!(
			"expected {} values but found {}",
			n_columns,
			pieces.len()
		));
	}
	Ok(pieces.into_iter().map(to_value).collect())
}

/// Sparse values are written `{index value, ...}`. Omitted entries are filled in by `push_row`.
fn parse_sparse_row(line: &str, n_columns: usize) -> Result<Vec<Value>, String> {
	let end = line
		.rfind('}')
		.ok_or_else(|| "unterminated sparse row".to_owned())?;
	let mut values: Vec<Value> = vec![Value::Omitted; n_columns];
	for entry in split_top_level(&line[1..end])? {
		if entry.is_empty() {
			continue;
		}
		let split = entry
			.find(char::is_whitespace)
			.ok_or_else(|| format!("malformed sparse entry \"{}\"", entry))?;
		let index: usize = entry[..split]
			.parse()
			.map_err(|_| format!("invalid sparse index \"{}\"", &entry[..split]))?;
		let value = values
			.get_mut(index)
			.ok_or_else(|| format!("sparse index {} is out of range", index))?;
		*value = to_value(entry[split..].trim());
	}
	Ok(values)
}

fn push_row(dataframe: &mut DataFrame, values: Vec<Value>) -> Result<(), String> {
	for (column, value) in dataframe.columns.iter_mut().zip(values.into_iter()) {
		match column {
			Column::Unknown(column) => column.len += 1,
			Column::Number(column) => {
				let value = match value {
					Value::Missing => std::f32::NAN,
					Value::Omitted => 0.0,
					Value::Given(value) => lexical::parse::<f32, &str>(&value)
						.ok()
						.filter(|value| value.is_finite())
						.ok_or_else(|| {
							format!("invalid numeric value \"{}\" for \"{}\"", value, column.name)
						})?,
				};
				column.data.push(value);
			}
			Column::Enum(column) => {
				let value = match value {
					Value::Missing => None,
					Value::Omitted => NonZeroUsize::new(1),
					Value::Given(value) => Some(column.option_index(&value).ok_or_else(|| {
						format!(
							"value \"{}\" is not declared for nominal attribute \"{}\"",
							value, column.name
						)
					})?),
				};
				column.data.push(value);
			}
			Column::Text(column) => match value {
				Value::Given(value) => column.data.push(value),
				Value::Missing | Value::Omitted => column.data.push(String::new()),
			},
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Cursor;

	const WEATHER: &str = r#"% the weather data
@relation weather

@attribute outlook {sunny, overcast, 'rainy day'}
@attribute 'air temperature' NUMERIC
@attribute play {yes,no}

@DATA
sunny,85,no
overcast,?,yes
'rainy day',70.5,yes
{1 64, 2 no}
"#;

	fn load(arff: &str) -> Result<DataFrame, LoadError> {
		DataFrame::from_arff(Cursor::new(arff), &LoadOptions::default())
	}

	#[test]
	fn test_weather() {
		let dataframe = load(WEATHER).unwrap();
		assert_eq!(
			dataframe.column_names(),
			vec!["outlook", "air temperature", "play"]
		);
		assert_eq!(dataframe.nrows(), 4);
		assert_eq!(dataframe.target_column_index, 2);
		let outlook = dataframe.columns[0].as_enum().unwrap();
		assert_eq!(outlook.options, vec!["sunny", "overcast", "rainy day"]);
		assert_eq!(
			outlook.data,
			vec![
				NonZeroUsize::new(1),
				NonZeroUsize::new(2),
				NonZeroUsize::new(3),
				NonZeroUsize::new(1),
			]
		);
		let temperature = dataframe.columns[1].as_number().unwrap();
		assert_eq!(temperature.data[0], 85.0);
		assert!(temperature.data[1].is_nan());
		assert_eq!(temperature.data[2], 70.5);
		assert_eq!(temperature.data[3], 64.0);
		let play = dataframe.columns[2].as_enum().unwrap();
		assert_eq!(play.data[3], NonZeroUsize::new(2));
	}

	#[test]
	fn test_string_attribute() {
		let arff = "@relation r\n@attribute note string\n@attribute c {a,b}\n@data\n'hello, world',a\n?,b\n";
		let dataframe = load(arff).unwrap();
		let note = dataframe.columns[0].as_text().unwrap();
		assert_eq!(note.data, vec!["hello, world".to_owned(), "".to_owned()]);
	}

	#[test]
	fn test_undeclared_nominal_value() {
		let arff = "@relation r\n@attribute c {a,b}\n@data\na\nz\n";
		let error = load(arff).unwrap_err();
		insta::assert_display_snapshot!(error, @r###"malformed arff file at line 5: value "z" is not declared for nominal attribute "c""###);
	}

	#[test]
	fn test_wrong_number_of_values() {
		let arff = "@relation r\n@attribute x numeric\n@attribute c {a,b}\n@data\n1,a,2\n";
		let error = load(arff).unwrap_err();
		assert!(matches!(error, LoadError::Arff { line: 5, .. }));
	}

	#[test]
	fn test_relational_is_unsupported() {
		let arff = "@relation r\n@attribute bag relational\n@data\n";
		let error = load(arff).unwrap_err();
		assert!(matches!(error, LoadError::Arff { line: 2, .. }));
	}

	#[test]
	fn test_no_data() {
		let error = load("@relation r\n@attribute c {a,b}\n@data\n").unwrap_err();
		assert!(matches!(error, LoadError::Empty));
		let error = load("@relation r\n").unwrap_err();
		assert!(matches!(error, LoadError::NoColumns));
	}

	#[test]
	fn test_named_target() {
		let dataframe = DataFrame::from_arff(
			Cursor::new(WEATHER),
			&LoadOptions {
				target_column: Some("outlook".to_owned()),
				..Default::default()
			},
		)
		.unwrap();
		assert_eq!(dataframe.target_column_index, 0);
	}

	#[test]
	fn test_from_path_detects_arff() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("weather.txt");
		std::fs::write(&path, WEATHER).unwrap();
		let dataframe = DataFrame::from_path(&path, &LoadOptions::default()).unwrap();
		assert_eq!(dataframe.nrows(), 4);
	}
}
