use usn_record_rs::{
    UsnRecord,
    format::{self, DateTimeFormat, FormatOptions},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: decode_record <file> [offset]")?;
    let offset: usize = match args.next() {
        Some(value) => value.parse()?,
        None => 0,
    };

    let data = std::fs::read(&path)?;
    let bytes = data.get(offset..).ok_or("offset is past the end of the file")?;

    let record = UsnRecord::parse(bytes)?;

    let options = FormatOptions {
        date_time: DateTimeFormat::Ctime,
        ..Default::default()
    };
    println!("{}", format::format_record(&record, &options));

    Ok(())
}
