use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fresco::image_proc::{
    DensityMapper, ImageSynthesizer, PsfImageSynthesizer, PsfSpec, SphColumnDensity,
    SynthesisRequest,
};
use fresco::nbody::NBodyConverter;
use fresco::photometry::assign_fixed_luminosity;
use fresco::{Band, Particle, ParticleKind, ParticleSet};
use shared::units::{Length, LengthExt, Luminosity, LuminosityExt, Mass, MassExt, Time, TimeExt};

fn make_stars(count: u64) -> ParticleSet {
    let mut stars = ParticleSet::from_particles(
        ParticleKind::Stars,
        (0..count)
            .map(|i| {
                let x = ((i * 37) % 100) as f64 / 25.0 - 2.0;
                let y = ((i * 53) % 100) as f64 / 25.0 - 2.0;
                Particle::at_parsecs(i, x, y, 0.0, 1.0)
            })
            .collect(),
    );
    assign_fixed_luminosity(&mut stars, &Band::ALL, Luminosity::from_solar_luminosities(1.0));
    stars
}

fn make_gas(count: u64) -> ParticleSet {
    let mut gas = ParticleSet::new(ParticleKind::Gas);
    for i in 0..count {
        let t = i as f64 * 0.01;
        let mut p = Particle::at_parsecs(i, 2.0 * t.cos() * t / 10.0, 2.0 * t.sin() * t / 10.0, 0.0, 0.1);
        p.radius = Some(Length::from_parsecs(0.1));
        gas.push(p);
    }
    gas
}

fn request<'a>(
    stars: &'a ParticleSet,
    converter: &'a NBodyConverter,
    psf: &'a PsfSpec,
) -> SynthesisRequest<'a> {
    SynthesisRequest {
        stars,
        gas: None,
        converter,
        image_width: Length::from_parsecs(5.0),
        image_size: (512, 512),
        percentile: 0.9995,
        calc_temperature: false,
        age: Time::from_megayears(0.0),
        vmax: None,
        bands: &Band::ALL,
        psf,
        zoom_factor: 0.25,
        extinction: false,
    }
}

fn bench_star_synthesis(c: &mut Criterion) {
    let stars_100 = make_stars(100);
    let stars_1000 = make_stars(1000);
    let converter =
        NBodyConverter::new(Mass::from_solar_masses(1000.0), Length::from_parsecs(5.0)).unwrap();
    let psf = PsfSpec::Hubble;
    let synth = PsfImageSynthesizer::new();

    let mut group = c.benchmark_group("make_image");
    group.bench_function("100_stars_512x512", |b| {
        let req = request(&stars_100, &converter, &psf);
        b.iter(|| synth.make_image(black_box(&req)).unwrap())
    });
    group.bench_function("1000_stars_512x512", |b| {
        let req = request(&stars_1000, &converter, &psf);
        b.iter(|| synth.make_image(black_box(&req)).unwrap())
    });
    group.finish();
}

fn bench_column_density(c: &mut Criterion) {
    let gas = make_gas(5000);
    let converter =
        NBodyConverter::new(Mass::from_solar_masses(500.0), Length::from_parsecs(5.0)).unwrap();

    c.bench_function("column_density_5000_gas_512x512", |b| {
        b.iter(|| {
            SphColumnDensity
                .column_density_map(
                    black_box(&gas),
                    &converter,
                    Length::from_parsecs(5.0),
                    (512, 512),
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_star_synthesis, bench_column_density);
criterion_main!(benches);
