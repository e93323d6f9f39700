mod common;

use common::{FakePin, FakeSpi};
use embedded_hal_mock::eh1::delay::NoopDelay;
use tcon_epd_core::{
    codec::{self, Bitmap, HEADER_LEN, PAYLOAD_LEN},
    command::{Body, Command},
    machine::CommandState,
    session::Session,
    Error, SessionConfig,
};

type FakeSession = Session<FakeSpi, FakePin, FakePin, NoopDelay>;

struct Rig {
    spi: FakeSpi,
    busy: FakePin,
    enable: FakePin,
}

impl Rig {
    fn idle() -> Self {
        Self {
            spi: FakeSpi::default(),
            busy: FakePin::idle(),
            enable: FakePin::disabled(),
        }
    }

    fn session(&self, config: SessionConfig) -> FakeSession {
        Session::new(
            self.spi.clone(),
            self.busy.clone(),
            self.enable.clone(),
            NoopDelay,
            config,
        )
    }
}

fn info_answer(text: &str) -> Vec<u8> {
    let mut raw = text.as_bytes().to_vec();
    raw.resize(32, 0);
    raw
}

#[test]
fn open_reads_and_caches_the_device_info() {
    let rig = Rig::idle();
    rig.spi.answer(&info_answer("MpicoSys TC-P74-230_v1.1"));

    let session = Session::open(
        rig.spi.clone(),
        rig.busy.clone(),
        rig.enable.clone(),
        NoopDelay,
        SessionConfig::default(),
    )
    .unwrap();

    let info = session.device_info().unwrap();
    assert_eq!(info.size.as_deref(), Some("P74"));
    assert_eq!(info.version.as_deref(), Some("230_v1.1"));
    assert_eq!(session.state(), CommandState::Done);

    assert_eq!(rig.spi.writes(), vec![vec![0x30, 0x01, 0x01, 0x00]]);
    // enabled for the command, disabled afterwards
    assert_eq!(rig.enable.writes(), vec![false, true]);
}

#[test]
fn primitive_commands_put_their_bytes_on_the_wire() {
    let rig = Rig::idle();
    let mut session = rig.session(SessionConfig::default());

    rig.spi.answer_ok(1);
    assert!(session.reset_data_pointer().unwrap().is_ok());
    rig.spi.answer(&[0x6D, 0x00]);
    let refresh = session.display_update().unwrap();
    assert_eq!(refresh.code, 0x6D00);
    assert!(!refresh.is_ok());

    assert_eq!(
        rig.spi.writes(),
        vec![vec![0x20, 0x0D, 0x00], vec![0x24, 0x01, 0x00]]
    );
    assert_eq!(rig.enable.writes(), vec![false, true, false, true]);
}

#[test]
fn unknown_status_word_fails_the_command() {
    let rig = Rig::idle();
    let mut session = rig.session(SessionConfig::default());

    rig.spi.answer(&[0x12, 0x34]);
    assert_eq!(
        session.display_update(),
        Err(Error::UnknownResultCode(0x1234))
    );
    // the lookup happens after the panel has been disabled again
    assert!(rig.enable.level());
}

#[test]
fn oversized_command_never_reaches_the_bus() {
    let rig = Rig::idle();
    let mut session = rig.session(SessionConfig::default());

    let data = [0u8; 300];
    let command = Command::new(0x20, 0x01, 0x00, Body::Data(&data));
    assert_eq!(
        session.execute_command(&command, 2),
        Err(Error::ChunkTooLarge(300))
    );
    assert!(rig.spi.writes().is_empty());
    assert_eq!(session.state(), CommandState::Errored);
    assert_eq!(rig.enable.writes(), vec![false, true]);
}

#[test]
fn packed_frame_is_uploaded_in_full_chunks_then_refreshed() {
    let rig = Rig::idle();
    let mut session = rig.session(SessionConfig::default());

    let mut bitmap = Bitmap::new();
    bitmap.set(10, 10, true);
    let frame = codec::pack(&bitmap);
    let bytes = frame.to_bytes();
    let chunks = (HEADER_LEN + PAYLOAD_LEN).div_ceil(250);

    // one status per chunk, the trailing drain, the refresh status
    rig.spi.answer_ok(chunks + 2);

    let report = session.upload_image(&frame).unwrap();
    assert_eq!(report.transfer.chunks, chunks);
    assert_eq!(report.transfer.bytes, bytes.len());
    assert!(report.refresh.is_ok());
    assert_eq!(rig.spi.pending_answers(), 0);

    let writes = rig.spi.writes();
    assert_eq!(writes.len(), chunks + 1);
    assert_eq!(writes.last().unwrap(), &vec![0x24, 0x01, 0x00]);

    let mut sent = vec![];
    for write in &writes[..chunks] {
        assert_eq!(write[..3], [0x20, 0x01, 0x00]);
        assert_eq!(usize::from(write[3]), write.len() - 4);
        sent.extend_from_slice(&write[4..]);
    }
    assert_eq!(sent, bytes);

    // the whole upload is a single enable/disable cycle
    assert_eq!(rig.enable.writes(), vec![false, true]);
}

#[test]
fn rejected_chunk_stops_the_transfer() {
    let rig = Rig::idle();
    let config = SessionConfig {
        max_chunk_size: 4,
        ..SessionConfig::default()
    };
    let mut session = rig.session(config);

    rig.spi.answer_ok(2);
    rig.spi.answer(&[0x6A, 0x00]);

    let err = session.upload_raw(&[0xAB; 20]).unwrap_err();
    assert!(
        matches!(err, Error::ChunkRejected { index: 2, code: 0x6A00, .. }),
        "{err:?}"
    );

    // chunks 4 and 5 never go out, neither does the refresh
    assert_eq!(rig.spi.writes().len(), 3);
    assert_eq!(session.state(), CommandState::Errored);
    assert_eq!(rig.enable.writes(), vec![false, true]);
}

#[test]
fn busy_panel_is_refused_and_left_enabled() {
    let rig = Rig {
        busy: FakePin::busy(),
        ..Rig::idle()
    };
    let mut session = rig.session(SessionConfig::default());

    assert_eq!(session.display_update(), Err(Error::BusyOrUnreachable));
    assert_eq!(session.state(), CommandState::Errored);
    assert!(rig.spi.writes().is_empty());
    assert_eq!(rig.enable.writes(), vec![false]);
    assert!(!rig.enable.level());
}

#[test]
fn close_disables_the_panel() {
    let rig = Rig {
        enable: FakePin::with_level(false),
        ..Rig::idle()
    };
    let session = rig.session(SessionConfig::default());

    let _hardware = session.close();
    assert_eq!(rig.enable.writes(), vec![true]);
}
