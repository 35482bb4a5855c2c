// Tests for the collage artifacts: flag downloads, CSV files and the collage

use image::{ImageFormat, Rgb, RgbImage};
use podium_core::artifacts::{
    CHEATSHEET_FILE, COLLAGE_FILE, MEDAL_LOOKUP_FILE, MedalRow, compose_collage, download_flags,
    write_medal_csv, write_pixel_csv,
};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png(colour: [u8; 3]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(3, 2, Rgb(colour))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

async fn flag_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/thumb/Flag_of_France.svg.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png([0, 35, 149])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thumb/Flag_of_Guinea-Bissau.svg.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png([206, 17, 38])))
        .mount(&server)
        .await;

    server
}

// ============================================================================
// Download Tests
// ============================================================================

#[tokio::test]
async fn test_download_flags_names_files_by_country() {
    let server = flag_server().await;
    let dir = TempDir::new().unwrap();
    let urls = vec![
        format!("{}/thumb/Flag_of_France.svg.png", server.uri()),
        format!("{}/thumb/Flag_of_Guinea-Bissau.svg.png", server.uri()),
    ];

    let saved = download_flags(&reqwest::Client::new(), &urls, dir.path(), 2)
        .await
        .unwrap();

    assert_eq!(saved, 2);
    assert!(dir.path().join("france.png").exists());
    assert!(dir.path().join("guinea_bissau.png").exists());
}

#[tokio::test]
async fn test_download_flags_skips_failures() {
    let server = flag_server().await;
    let dir = TempDir::new().unwrap();
    let urls = vec![
        format!("{}/thumb/Flag_of_France.svg.png", server.uri()),
        format!("{}/thumb/Flag_of_Atlantis.svg.png", server.uri()),
    ];

    let saved = download_flags(&reqwest::Client::new(), &urls, dir.path(), 4)
        .await
        .unwrap();

    assert_eq!(saved, 1);
    assert!(!dir.path().join("atlantis.png").exists());
}

#[tokio::test]
async fn test_download_flags_creates_directory() {
    let server = flag_server().await;
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("flags").join("2012");
    let urls = vec![format!("{}/thumb/Flag_of_France.svg.png", server.uri())];

    download_flags(&reqwest::Client::new(), &urls, &nested, 1)
        .await
        .unwrap();

    assert!(nested.join("france.png").exists());
}

// ============================================================================
// Collage Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_full_collage_pipeline() {
    let server = flag_server().await;
    let dir = TempDir::new().unwrap();
    let urls = vec![
        format!("{}/thumb/Flag_of_France.svg.png", server.uri()),
        format!("{}/thumb/Flag_of_Guinea-Bissau.svg.png", server.uri()),
    ];
    download_flags(&reqwest::Client::new(), &urls, dir.path(), 2)
        .await
        .unwrap();

    assert_eq!(write_pixel_csv(dir.path()).unwrap(), 2);
    let rows = vec![MedalRow {
        country: "France".to_string(),
        gold: "11".to_string(),
        silver: "11".to_string(),
        bronze: "13".to_string(),
    }];
    write_medal_csv(&rows, dir.path()).unwrap();
    compose_collage(dir.path(), 8).unwrap();

    let cheatsheet = fs::read_to_string(dir.path().join(CHEATSHEET_FILE)).unwrap();
    let lines: Vec<&str> = cheatsheet.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "france,002395 002395 002395,002395 002395 002395");
    assert!(lines[1].starts_with("guinea_bissau,CE1126 "));

    let medals = fs::read_to_string(dir.path().join(MEDAL_LOOKUP_FILE)).unwrap();
    assert_eq!(medals, "Country,Gold,Silver,Bronze\nFrance,11,11,13\n");

    let collage = image::open(dir.path().join(COLLAGE_FILE)).unwrap();
    assert_eq!((collage.width(), collage.height()), (16, 16));
}

#[test]
fn test_rerunning_ignores_previous_collage() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("france.png"), png([0, 35, 149])).unwrap();

    compose_collage(dir.path(), 4).unwrap();
    compose_collage(dir.path(), 4).unwrap();
    assert_eq!(write_pixel_csv(dir.path()).unwrap(), 1);

    // One flag, so a one-by-one grid both times.
    let collage = image::open(dir.path().join(COLLAGE_FILE)).unwrap();
    assert_eq!((collage.width(), collage.height()), (4, 4));
}
