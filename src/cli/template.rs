use std::path::PathBuf;

use crate::error::{Result, SitebooksError};
use crate::resolver::{self, EntityType};
use crate::templates::write_template;

/// Write starter CSVs with the canonical headers the importer expects.
/// With no entity, writes one template per entity into the output directory.
pub fn run(entity: Option<&str>, output: Option<&str>) -> Result<()> {
    match entity {
        Some(label) => {
            let entity = resolver::resolve(label)
                .ok_or_else(|| SitebooksError::UnknownEntity(label.to_string()))?;
            let path = output
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("{}.csv", entity.key())));
            write_template(entity, &path)?;
            println!("Wrote {}", path.display());
        }
        None => {
            let dir = PathBuf::from(output.unwrap_or("."));
            std::fs::create_dir_all(&dir)?;
            for entity in EntityType::ALL {
                let path = dir.join(format!("{}.csv", entity.key()));
                write_template(*entity, &path)?;
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}
