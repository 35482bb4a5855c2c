//! Files produced by the collage command: downloaded flags, a pixel cheat
//! sheet, a medal lookup table and the collage itself.

use crate::input::flag_file_stem;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CHEATSHEET_FILE: &str = "cheatsheet.csv";
pub const MEDAL_LOOKUP_FILE: &str = "medallookup.csv";
pub const COLLAGE_FILE: &str = "flagcollage.png";
pub const DEFAULT_FLAG_SIZE: u32 = 50;

/// One nation's medal counts for an edition, as printed in its medal table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalRow {
    pub country: String,
    pub gold: String,
    pub silver: String,
    pub bronze: String,
}

/// Download every flag image into `dir` as `<country>.png`.
///
/// Returns how many were saved. A failed download is logged and skipped.
pub async fn download_flags(
    client: &reqwest::Client,
    urls: &[String],
    dir: &Path,
    workers: usize,
) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create flag directory {}", dir.display()))?;
    info!("Downloading {} flags to {}", urls.len(), dir.display());

    let saved = stream::iter(urls)
        .map(|url| async move {
            let path = dir.join(format!("{}.png", flag_file_stem(url)));
            match download_one(client, url, &path).await {
                Ok(()) => {
                    debug!("Saved {} to {}", url, path.display());
                    true
                }
                Err(e) => {
                    warn!("Failed to download {}: {:#}", url, e);
                    false
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .filter(|ok| std::future::ready(*ok))
        .count()
        .await;

    info!("Downloaded {} of {} flags", saved, urls.len());
    Ok(saved)
}

async fn download_one(client: &reqwest::Client, url: &str, path: &Path) -> Result<()> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// PNG files in `dir`, sorted by name, leaving out the collage.
pub fn flag_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_lowercase) else {
            continue;
        };
        if name.ends_with(".png") && !name.contains("flagcollage") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Write `cheatsheet.csv`: per flag, its name followed by one field per
/// image row holding that row's pixels as space-separated `RRGGBB` values.
///
/// Returns the number of flags written.
pub fn write_pixel_csv(dir: &Path) -> Result<usize> {
    let files = flag_files(dir)?;
    let out = dir.join(CHEATSHEET_FILE);
    let mut writer = BufWriter::new(
        File::create(&out).with_context(|| format!("Failed to create {}", out.display()))?,
    );

    let mut written = 0;
    for path in &files {
        let image = match image::open(path) {
            Ok(image) => image.to_rgb8(),
            Err(e) => {
                warn!("Skipping unreadable image {}: {}", path.display(), e);
                continue;
            }
        };

        let mut record = vec![file_stem(path)];
        record.extend(image.rows().map(|row| {
            row.map(|Rgb([r, g, b])| format!("{:02X}{:02X}{:02X}", r, g, b))
                .collect::<Vec<_>>()
                .join(" ")
        }));
        write_row(&mut writer, &record)?;
        written += 1;
    }

    writer.flush()?;
    info!("Pixel cheat sheet for {} flags saved to {}", written, out.display());
    Ok(written)
}

/// Write `medallookup.csv` with a `Country,Gold,Silver,Bronze` header.
pub fn write_medal_csv(rows: &[MedalRow], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let out = dir.join(MEDAL_LOOKUP_FILE);
    let mut writer = BufWriter::new(
        File::create(&out).with_context(|| format!("Failed to create {}", out.display()))?,
    );

    write_row(&mut writer, &["Country", "Gold", "Silver", "Bronze"].map(String::from))?;
    for row in rows {
        write_row(
            &mut writer,
            &[
                row.country.clone(),
                row.gold.clone(),
                row.silver.clone(),
                row.bronze.clone(),
            ],
        )?;
    }

    writer.flush()?;
    info!("Medal lookup with {} rows saved to {}", rows.len(), out.display());
    Ok(out)
}

/// Tile every flag in `dir` into `flagcollage.png`: a white square grid,
/// `ceil(sqrt(n))` flags per side, each resized to `size` by `size`.
pub fn compose_collage(dir: &Path, size: u32) -> Result<PathBuf> {
    let files = flag_files(dir)?;
    if files.is_empty() {
        anyhow::bail!("No flag images found in {}", dir.display());
    }

    let grid = (files.len() as f64).sqrt().ceil() as u32;
    let Some(side) = grid
        .checked_mul(size)
        .filter(|side| side.checked_mul(*side).and_then(|px| px.checked_mul(3)).is_some())
    else {
        anyhow::bail!("A {}x{} grid of {}px flags is too large for one image", grid, grid, size);
    };
    let mut collage = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));

    let mut slot = 0u32;
    for path in &files {
        let flag = match image::open(path) {
            Ok(flag) => flag.resize_exact(size, size, FilterType::Triangle).to_rgb8(),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };
        let x = (slot % grid) * size;
        let y = (slot / grid) * size;
        imageops::overlay(&mut collage, &flag, i64::from(x), i64::from(y));
        slot += 1;
    }

    let out = dir.join(COLLAGE_FILE);
    collage
        .save(&out)
        .with_context(|| format!("Failed to save collage to {}", out.display()))?;
    info!("Collage of {} flags saved to {}", slot, out.display());
    Ok(out)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn save_flag(dir: &Path, name: &str, colour: [u8; 3], width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb(colour))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_write_row_quotes_when_needed() {
        let mut out = Vec::new();
        write_row(&mut out, &["Korea, South".to_string(), "1".to_string(), "say \"hi\"".to_string()])
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"Korea, South\",1,\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_flag_files_skip_collage_and_other_files() {
        let dir = TempDir::new().unwrap();
        save_flag(dir.path(), "b.png", [0, 0, 0], 1, 1);
        save_flag(dir.path(), "a.png", [0, 0, 0], 1, 1);
        save_flag(dir.path(), COLLAGE_FILE, [0, 0, 0], 1, 1);
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let names: Vec<String> = flag_files(dir.path()).unwrap().iter().map(|p| file_stem(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_pixel_csv() {
        let dir = TempDir::new().unwrap();
        save_flag(dir.path(), "france.png", [0x00, 0x23, 0x95], 2, 2);

        assert_eq!(write_pixel_csv(dir.path()).unwrap(), 1);
        let csv = fs::read_to_string(dir.path().join(CHEATSHEET_FILE)).unwrap();
        assert_eq!(csv, "france,002395 002395,002395 002395\n");
    }

    #[test]
    fn test_medal_csv() {
        let dir = TempDir::new().unwrap();
        let rows = vec![MedalRow {
            country: "United States".to_string(),
            gold: "40".to_string(),
            silver: "44".to_string(),
            bronze: "42".to_string(),
        }];

        let path = write_medal_csv(&rows, dir.path()).unwrap();
        let csv = fs::read_to_string(path).unwrap();
        assert_eq!(csv, "Country,Gold,Silver,Bronze\nUnited States,40,44,42\n");
    }

    #[test]
    fn test_collage_grid() {
        let dir = TempDir::new().unwrap();
        save_flag(dir.path(), "a.png", [0, 0, 0], 4, 3);
        save_flag(dir.path(), "b.png", [255, 0, 0], 4, 3);
        save_flag(dir.path(), "c.png", [0, 0, 255], 4, 3);

        let path = compose_collage(dir.path(), 10).unwrap();
        let collage = image::open(path).unwrap().to_rgb8();

        // Three flags need a 2x2 grid; the last slot stays white.
        assert_eq!(collage.dimensions(), (20, 20));
        assert_eq!(*collage.get_pixel(15, 5), Rgb([255, 0, 0]));
        assert_eq!(*collage.get_pixel(5, 15), Rgb([0, 0, 255]));
        assert_eq!(*collage.get_pixel(15, 15), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_collage_rejects_oversized_grid() {
        let dir = TempDir::new().unwrap();
        save_flag(dir.path(), "a.png", [0, 0, 0], 1, 1);
        save_flag(dir.path(), "b.png", [0, 0, 0], 1, 1);

        assert!(compose_collage(dir.path(), u32::MAX / 2 + 1).is_err());
        assert!(compose_collage(dir.path(), 40_000).is_err());
        assert!(!dir.path().join(COLLAGE_FILE).exists());
    }

    #[test]
    fn test_collage_needs_flags() {
        let dir = TempDir::new().unwrap();
        assert!(compose_collage(dir.path(), 10).is_err());
    }
}
