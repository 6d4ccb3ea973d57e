use std::path::Path;

use proploader_codec::LoaderCommand;
use proploader_image::{assemble_file, Image};
use proploader_transport::Connection;
use tracing::info;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::session::{LoadReport, LoadRequest, LoaderSession};

/// Send `image` to the target behind `conn` and run it per `command`.
///
/// Exactly one packet is sent. The call returns once the target has
/// acknowledged the checksum, or with the first error.
pub fn load<C: Connection>(
    conn: C,
    image: &Image,
    command: LoaderCommand,
    config: &LoaderConfig,
) -> Result<LoadReport> {
    info!(image_len = image.len(), %command, "loading image");
    LoaderSession::new(conn, LoadRequest::load(image, command), config.clone()).run()
}

/// Assemble the file at `path` and [`load`] it.
///
/// Assembly happens before the connection is touched, so a bad file never
/// resets the target.
pub fn load_file<C: Connection>(
    conn: C,
    path: impl AsRef<Path>,
    command: LoaderCommand,
    config: &LoaderConfig,
) -> Result<LoadReport> {
    let image = assemble_file(path)?;
    load(conn, &image, command, config)
}

/// Handshake with the target and return its hardware version.
///
/// The target is sent the shutdown command afterwards.
pub fn identify<C: Connection>(conn: C, config: &LoaderConfig) -> Result<u8> {
    let report = LoaderSession::new(conn, LoadRequest::Identify, config.clone()).run()?;
    Ok(report.version)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use proploader_image::ImageSource;

    use super::*;
    use crate::error::LoaderError;
    use crate::session::tests::ScriptedConnection;

    #[test]
    fn load_reports_command() {
        let mut conn = ScriptedConnection::healthy();
        let image = Image::new(vec![0x01, 0x02, 0x03, 0x04], ImageSource::Binary);

        let report = load(
            &mut conn,
            &image,
            LoaderCommand::LoadProgramShutdown,
            &LoaderConfig::default(),
        )
        .expect("load should succeed");

        assert_eq!(report.command, Some(LoaderCommand::LoadProgramShutdown));
        assert_eq!(report.packet_len, conn.sent.len());
        assert_eq!(
            &conn.sent[198..209],
            LoaderCommand::LoadProgramShutdown.encoded()
        );
    }

    #[test]
    fn identify_returns_version() {
        let mut conn = ScriptedConnection::healthy();
        let version = identify(&mut conn, &LoaderConfig::default()).expect("identify should succeed");
        assert_eq!(version, 1);
        assert_eq!(&conn.sent[198..], LoaderCommand::Shutdown.encoded());
    }

    #[test]
    fn load_file_reads_and_sends() {
        let dir = std::env::temp_dir().join(format!("proploader-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join("blink.binary");
        let mut file = std::fs::File::create(&path).expect("image file should be creatable");
        file.write_all(&[0xDE, 0xAD, 0xBE, 0xEF])
            .expect("image should be writable");
        drop(file);

        let mut conn = ScriptedConnection::healthy();
        let report = load_file(&mut conn, &path, LoaderCommand::LoadRunRam, &LoaderConfig::default())
            .expect("load should succeed");
        assert_eq!(report.command, Some(LoaderCommand::LoadRunRam));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_file_fails_before_touching_connection() {
        let mut conn = ScriptedConnection::healthy();
        let result = load_file(
            &mut conn,
            "/nonexistent/proploader/image.elf",
            LoaderCommand::LoadRunRam,
            &LoaderConfig::default(),
        );
        assert!(matches!(result, Err(LoaderError::Image(_))));
        assert!(conn.calls.is_empty());
    }
}
