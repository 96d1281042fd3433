use luminapress::{export_from_json, OutputFormat};
use std::env;
use std::error::Error;
use std::io::{self, Read, Write};

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();

	let mut json = String::new();
	let mut stdin = io::stdin();
	stdin.read_to_string(&mut json)?;

	let format = if env::args().any(|x| x == "-epub") {
		OutputFormat::Epub
	} else if env::args().any(|x| x == "-docx") {
		OutputFormat::Docx
	} else {
		OutputFormat::Pdf
	};

	let output = export_from_json(&json, format)?;

	io::stdout()
		.write_all(&output)?;
	Ok(())
}
