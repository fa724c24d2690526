use bencher::Bencher;
use bencher::{benchmark_group, benchmark_main};
use spake2::{Config, Ed25519Group, Group, Identity, Kdf, Password, Spake2};

fn spake2_start(bench: &mut Bencher) {
    bench.iter(|| {
        let (_, _) = Spake2::<Ed25519Group>::start_a(
            &Password::new(b"password"),
            &Identity::new(b"idA"),
            &Identity::new(b"idB"),
        )
        .unwrap();
    })
}

fn spake2_start_and_finish(bench: &mut Bencher) {
    let (_, msg2) = Spake2::<Ed25519Group>::start_b(
        &Password::new(b"password"),
        &Identity::new(b"idA"),
        &Identity::new(b"idB"),
    )
    .unwrap();
    let msg2_slice = msg2.as_slice();
    bench.iter(|| {
        let (mut s1, _) = Spake2::<Ed25519Group>::start_a(
            &Password::new(b"password"),
            &Identity::new(b"idA"),
            &Identity::new(b"idB"),
        )
        .unwrap();
        s1.finish(msg2_slice)
    })
}

fn spake2_start_and_finish_legacy(bench: &mut Bencher) {
    let (_, msg2) = Spake2::<Ed25519Group>::start_b(
        &Password::new(b"password"),
        &Identity::new(b"idA"),
        &Identity::new(b"idB"),
    )
    .unwrap();
    let msg2_slice = msg2.as_slice();
    bench.iter(|| {
        let mut s1 = Spake2::<Ed25519Group>::new_a(
            &Password::new(b"password"),
            &Identity::new(b"idA"),
            &Identity::new(b"idB"),
            Config {
                kdf: Kdf::Legacy,
                ..Default::default()
            },
        )
        .unwrap();
        let _ = s1.start();
        s1.finish(msg2_slice)
    })
}

fn bytes_to_element(bench: &mut Bencher) {
    let (_, msg) = Spake2::<Ed25519Group>::start_symmetric(
        &Password::new(b"password"),
        &Identity::new(b"idS"),
    )
    .unwrap();
    bench.iter(|| Ed25519Group::bytes_to_element(&msg[1..]))
}

fn arbitrary_element(bench: &mut Bencher) {
    bench.iter(|| Ed25519Group::arbitrary_element(b"symmetric"))
}

benchmark_group!(
    benches,
    spake2_start,
    spake2_start_and_finish,
    spake2_start_and_finish_legacy,
    bytes_to_element,
    arbitrary_element
);
benchmark_main!(benches);
