use anyhow::{Context, Result};
use kpiboard::{
    load::{parse_table, SheetFormat},
    resolve::ColumnLayout,
    schema::{Field, KpiSchema},
};
use std::{env, fs, path::Path};

/// Print which header each semantic field was matched to, for a local sheet.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <sheet.csv|sheet.xlsx> [schema]", args[0]);
        std::process::exit(1);
    }
    let path = Path::new(&args[1]);
    let schema = match args.get(2) {
        Some(name) => KpiSchema::from_preset_or_path(name)?,
        None => KpiSchema::default(),
    };

    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let format = SheetFormat::detect(&args[1], &data);
    let table = parse_table(data, format, &args[1])?;
    let layout = ColumnLayout::detect(&table.headers, &schema);

    println!("{} ({:?}, {} rows)", path.display(), format, table.rows.len());
    println!("field,header,index,match");
    for field in Field::ALL {
        match layout.get(field) {
            Some(m) => println!("{},{:?},{},{:?}", field, m.header, m.index, m.kind),
            None => println!("{},<none>,,", field),
        }
    }
    Ok(())
}
