mod common;

use common::{
    settings, write_capture, Record, CLOSED_LIDS, FRAME_HEIGHT, FRAME_WIDTH, OPEN_LIDS, STEP_PX,
};
use gaze_pointer::devices::camera::ReplayCapture;
use gaze_pointer::devices::detector::RecordedDetector;
use gaze_pointer::devices::injector::{ActionLog, DryRunInjector, InjectedAction};
use gaze_pointer::session::{ExitReason, Session};
use tempfile::NamedTempFile;

fn face(t: f64, iris_x: f64, lid_gap: f64) -> Record {
    Record::Face { t, iris_x, lid_gap }
}

/// 返回的临时文件需要在会话结束前保持存活
fn session_for(records: &[Record]) -> (Session, ActionLog, NamedTempFile) {
    let file = write_capture(records);
    let source = ReplayCapture::open(file.path(), FRAME_WIDTH, FRAME_HEIGHT, 1.0 / 30.0)
        .expect("open capture");
    let injector = DryRunInjector::new(None);
    let log = injector.log();
    let session = Session::new(
        Box::new(source),
        Box::new(RecordedDetector),
        Box::new(injector),
        None,
        settings(),
        0,
    );
    (session, log, file)
}

#[tokio::test]
async fn recorded_session_moves_clicks_and_pauses() {
    let mut records = Vec::new();
    // 向右看：第二帧确认后移动一次，冷却内不再移动
    for t in [0.0, 0.1, 0.2, 0.3, 0.4, 0.5] {
        records.push(face(t, 0.1, OPEN_LIDS));
    }
    // 冷却结束后仍在向右看，再移动一次
    records.push(face(1.0, 0.1, OPEN_LIDS));
    // 单帧眨眼
    records.push(face(2.0, 0.5, CLOSED_LIDS));
    for t in [2.1, 2.2, 2.3] {
        records.push(face(t, 0.5, OPEN_LIDS));
    }
    records.push(Record::NoFace { t: 2.4 });
    // 持续闭眼超过一秒：切换为暂停，只切换一次
    for i in 0..=15 {
        records.push(face(3.0 + f64::from(i) * 0.1, 0.5, CLOSED_LIDS));
    }
    // 暂停后向左看不产生移动
    for t in [5.0, 5.1, 5.2, 5.3, 5.4, 5.5] {
        records.push(face(t, 0.9, OPEN_LIDS));
    }
    let total = records.len() as u64;

    let (session, log, _file) = session_for(&records);
    let summary = session.run_until(std::future::pending()).await;

    assert_eq!(summary.exit, ExitReason::EndOfStream);
    assert_eq!(summary.frames, total);
    assert_eq!(summary.failed_frames, 0);
    assert!(summary.paused);
    // 两次移动 + 一次点击 + 一次暂停切换
    assert_eq!(summary.events, 4);

    let actions = log.lock().expect("log lock").clone();
    assert_eq!(
        actions,
        vec![
            InjectedAction::MoveRelative { dx: STEP_PX, dy: 0 },
            InjectedAction::MoveRelative { dx: STEP_PX, dy: 0 },
            InjectedAction::Click,
        ]
    );
}

#[tokio::test]
async fn missing_faces_produce_no_actions() {
    let records: Vec<Record> = (0..20)
        .map(|i| Record::NoFace {
            t: f64::from(i) / 30.0,
        })
        .collect();

    let (session, log, _file) = session_for(&records);
    let summary = session.run_until(std::future::pending()).await;

    assert_eq!(summary.frames, 20);
    assert_eq!(summary.events, 0);
    assert!(!summary.paused);
    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn malformed_records_are_skipped() {
    use std::io::Write;

    let mut file = NamedTempFile::new().expect("tempfile");
    writeln!(file, "{{\"t\": 0.0, \"landmarks\": null}}").expect("write");
    writeln!(file, "{{\"t\": \"soon\"}}").expect("write");
    writeln!(file, "{{\"t\": 0.1, \"landmarks\": null}}").expect("write");
    file.flush().expect("flush");

    let source = ReplayCapture::open(file.path(), FRAME_WIDTH, FRAME_HEIGHT, 1.0 / 30.0)
        .expect("open capture");
    let session = Session::new(
        Box::new(source),
        Box::new(RecordedDetector),
        Box::new(DryRunInjector::new(None)),
        None,
        settings(),
        0,
    );
    let summary = session.run_until(std::future::pending()).await;

    assert_eq!(summary.frames, 2);
    assert_eq!(summary.failed_frames, 1);
    assert_eq!(summary.exit, ExitReason::EndOfStream);
}
