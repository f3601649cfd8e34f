use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, company: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(name) = company {
        settings.company_name = name;
    }

    std::fs::create_dir_all(&settings.data_dir)?;
    let conn = get_connection(&std::path::Path::new(&settings.data_dir).join("sitebooks.db"))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized sitebooks database in {}", settings.data_dir);
    Ok(())
}
