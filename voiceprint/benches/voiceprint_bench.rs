use criterion::{Criterion, black_box, criterion_group, criterion_main};
use voxgate_voiceprint::{
    FbankConfig, FbankModel, FbankModelConfig, Pcm16, VoiceprintModel, compute_fbank,
};

fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: u32) -> Vec<f32> {
    (0..n_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as f32
        })
        .collect()
}

fn bench_fbank_1s(c: &mut Criterion) {
    let cfg = FbankConfig::default();
    let audio = make_sine(440.0, 16000, 16000);

    c.bench_function("voiceprint_fbank_1s", |b| {
        b.iter(|| {
            let _ = black_box(compute_fbank(black_box(&audio), &cfg));
        });
    });
}

fn bench_extract_3s(c: &mut Criterion) {
    let model = FbankModel::new(FbankModelConfig::default()).expect("model");
    let audio = Pcm16::from_f32(16000, &make_sine(180.0, 48000, 16000));

    c.bench_function("voiceprint_extract_3s_16k", |b| {
        b.iter(|| {
            let _ = black_box(model.extract(black_box(&audio)));
        });
    });
}

fn bench_extract_3s_resampled(c: &mut Criterion) {
    let model = FbankModel::new(FbankModelConfig::default()).expect("model");
    let audio = Pcm16::from_f32(48000, &make_sine(180.0, 144000, 48000));

    c.bench_function("voiceprint_extract_3s_48k", |b| {
        b.iter(|| {
            let _ = black_box(model.extract(black_box(&audio)));
        });
    });
}

criterion_group!(
    benches,
    bench_fbank_1s,
    bench_extract_3s,
    bench_extract_3s_resampled
);
criterion_main!(benches);
