//! End-to-end test: builds a complete synthetic GSF byte stream in memory, indexes it,
//! and materializes its beam arrays, covering the scenarios described for the decoder.
use gsf_in::sink::VecSink;
use gsf_in::stream::MemoryStream;
use gsf_in::{indexer, materializer, GsfSettings};
use std::io::Write;

fn record(datasize: u32, id: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = datasize.to_be_bytes().to_vec();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

fn ping_header(sec: i32, n_beams: u16) -> Vec<u8> {
    let mut buf = vec![];
    buf.extend_from_slice(&sec.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&450_000_000i32.to_be_bytes()); // longitude 45.0
    buf.extend_from_slice(&450_000_000i32.to_be_bytes()); // latitude 45.0
    buf.extend_from_slice(&n_beams.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&0i16.to_be_bytes());
    buf
}

fn scale_factors(entries: &[(u32, i32, i32)]) -> Vec<u8> {
    let mut sf = vec![];
    sf.extend_from_slice(&(entries.len() as i32).to_be_bytes());
    for (id, scale, offset) in entries {
        let id_word: i32 = (*id as i32) << 24;
        sf.extend_from_slice(&id_word.to_be_bytes());
        sf.extend_from_slice(&scale.to_be_bytes());
        sf.extend_from_slice(&offset.to_be_bytes());
    }
    let hdr: u32 = (100u32 << 24) | (sf.len() as u32);
    let mut out = hdr.to_be_bytes().to_vec();
    out.extend_from_slice(&sf);
    out
}

fn depth_array(values: &[u16]) -> Vec<u8> {
    let mut data = vec![];
    for v in values {
        data.extend_from_slice(&v.to_be_bytes());
    }
    let hdr: u32 = (1u32 << 24) | (data.len() as u32);
    let mut out = hdr.to_be_bytes().to_vec();
    out.extend_from_slice(&data);
    out
}

fn build_synthetic_file() -> Vec<u8> {
    let mut out = vec![];
    out.extend_from_slice(&record(4, 1, b"GSF3"));

    let mut ping0 = ping_header(0, 3);
    ping0.extend_from_slice(&scale_factors(&[(1, 100, 0)]));
    ping0.extend_from_slice(&depth_array(&[1000, 1100, 1200]));
    out.extend_from_slice(&record(ping0.len() as u32, 2, &ping0));

    let mut ping1 = ping_header(1, 3);
    ping1.extend_from_slice(&depth_array(&[1300, 1400, 1500]));
    out.extend_from_slice(&record(ping1.len() as u32, 2, &ping1));

    out
}

#[test]
fn indexes_and_materializes_a_synthetic_file_end_to_end() {
    let bytes = build_synthetic_file();
    let mut stream = MemoryStream::from_vec(bytes);
    let settings = GsfSettings::default();

    let info = indexer::index(&mut stream, "memory://synthetic", &settings).unwrap();
    assert_eq!(info.version.as_deref(), Some("GSF3"));
    assert_eq!(info.ping_info.len(), 2);
    assert_eq!(info.ping_groups.len(), 1);
    assert!(!info.quality_info.duplicate_pings);

    let mut sink = VecSink::default();
    materializer::materialize(&mut stream, &info, &settings, &mut sink).unwrap();

    assert_eq!(sink.ping_beams.len(), 2);
    assert_eq!(sink.ping_beams[0].values, vec![10.0, 11.0, 12.0]);
    assert_eq!(sink.ping_beams[1].values, vec![13.0, 14.0, 15.0]);
}

#[test]
fn file_backed_stream_round_trips_through_a_real_file() {
    let bytes = build_synthetic_file();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let settings = GsfSettings::default();
    let mut handle = gsf_in::GsfFile::open(file.path(), settings.clone()).unwrap();
    assert_eq!(handle.info().ping_info.len(), 2);

    let mut sink = VecSink::default();
    handle.materialize(&mut sink).unwrap();
    assert_eq!(sink.ping_beams.len(), 2);
}
