use assert_fs::TempDir;
use rusqlite::{Connection, params};
use std::fs;
use std::path::PathBuf;

/// A target directory with config, plus a synthetic photos library
/// next to it.
pub struct ExportFixture {
    pub target: PathBuf,
    pub library: PathBuf,
    pub staging: PathBuf,
}

const MASTERS_REL: &str = "2018/04/30/20180430-203014";

/// Build a library containing one burst photo, one video, one
/// screenshot and one uncategorizable asset, all in import batch-1,
/// and a target directory whose photoexport.ini points at it.
pub fn setup_fixture(temp_dir: &TempDir) -> ExportFixture {
    let target = temp_dir.path().join("target");
    let library = temp_dir.path().join("Photos.photoslibrary");
    let staging = temp_dir.path().join("staging");

    let masters = library.join("Masters").join(MASTERS_REL);
    fs::create_dir_all(&target).unwrap();
    fs::create_dir_all(&masters).unwrap();
    fs::create_dir_all(library.join("database")).unwrap();
    fs::create_dir_all(library.join("resources/media/master")).unwrap();
    fs::create_dir_all(library.join("resources/media/version")).unwrap();

    fs::write(masters.join("IMG_0100.JPG"), b"burst image bytes").unwrap();
    fs::write(masters.join("IMG_0101.MOV"), b"video bytes").unwrap();

    let conn = Connection::open(library.join("database/photos.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE RKMaster (
             modelId INTEGER PRIMARY KEY,
             uuid TEXT,
             fileName TEXT,
             imagePath TEXT,
             fileCreationDate REAL,
             mediaGroupId TEXT,
             burstUuid TEXT,
             UTI TEXT,
             importGroupUuid TEXT,
             width INTEGER,
             height INTEGER,
             hasAttachments INTEGER
         );
         CREATE TABLE RKVersion (
             modelId INTEGER PRIMARY KEY,
             masterUuid TEXT,
             selfPortrait INTEGER
         );
         CREATE TABLE RKAttachment (
             modelId INTEGER PRIMARY KEY,
             attachedToUuid TEXT,
             filePath TEXT,
             fileModificationDate REAL
         );",
    )
    .unwrap();

    let rows: [(i64, &str, &str, i64, Option<&str>, &str); 4] = [
        (1, "uuid-1", "IMG_0100.JPG", 546_805_814, Some("B1"), "public.jpeg"),
        (2, "uuid-2", "IMG_0101.MOV", 546_805_900, None, "com.apple.quicktime-movie"),
        (3, "uuid-3", "IMG_0102.PNG", 546_806_000, None, "public.png"),
        (4, "uuid-4", "weird.tiff", 546_806_100, None, "public.tiff"),
    ];
    for (id, uuid, filename, creation, burst_id, uti) in rows {
        conn.execute(
            "INSERT INTO RKMaster (modelId, uuid, fileName, imagePath, fileCreationDate,
                                   mediaGroupId, burstUuid, UTI, importGroupUuid,
                                   width, height, hasAttachments)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7, 'batch-1', 4032, 3024, NULL)",
            params![
                id,
                uuid,
                filename,
                format!("{MASTERS_REL}/{filename}"),
                creation as f64,
                burst_id,
                uti
            ],
        )
        .unwrap();
    }
    drop(conn);

    fs::write(
        target.join("photoexport.ini"),
        format!(
            "[paths]\nlibrary = {}\nstaging = {}\n",
            library.display(),
            staging.display()
        ),
    )
    .unwrap();

    ExportFixture {
        target,
        library,
        staging,
    }
}
