use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use h264_bitstream::{H264Stream, nal_to_rbsp_vec, rbsp_to_nal_vec, write_annexb};

const SPS_NAL: [u8; 8] = [0x67, 0x42, 0xC0, 0x1E, 0xDA, 0x05, 0x07, 0xE4];
const PPS_NAL: [u8; 4] = [0x68, 0xCE, 0x38, 0x80];

fn benchmark_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("H.264 Stream");

    let slice = create_slice_nal(64 * 1024);
    let stream = create_stream(&slice, 32);

    group.bench_function("nal_to_rbsp", |b| {
        b.iter(|| {
            nal_to_rbsp_vec(black_box(&slice)).unwrap();
        })
    });

    let rbsp = nal_to_rbsp_vec(&slice).unwrap();
    group.bench_function("rbsp_to_nal", |b| {
        b.iter(|| {
            rbsp_to_nal_vec(black_box(&rbsp)).unwrap();
        })
    });

    group.bench_function("read_annexb", |b| {
        b.iter(|| {
            let mut h264 = H264Stream::new();
            h264.read_annexb(black_box(&stream)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_stream);
criterion_main!(benches);

/// An IDR slice of the 320x240 Baseline stream followed by `data_len` bytes of
/// slice data full of `00 00 0x` runs.
fn create_slice_nal(data_len: usize) -> Vec<u8> {
    let mut rbsp = vec![0x65, 0x88, 0x84, 0xB5];
    rbsp.extend((0..data_len).map(|i| match i % 4 {
        0 | 1 => 0x00,
        2 => (i % 3) as u8,
        _ => 0x42,
    }));
    rbsp.push(0x80);

    rbsp_to_nal_vec(&rbsp).unwrap()
}

fn create_stream(slice: &[u8], slices: usize) -> Vec<u8> {
    let mut nals = vec![SPS_NAL.to_vec(), PPS_NAL.to_vec()];
    nals.extend(std::iter::repeat_n(slice.to_vec(), slices));
    write_annexb(nals)
}
