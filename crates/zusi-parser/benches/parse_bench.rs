//! `criterion` benchmarks over a small and a large synthetic `Strecke`
//! document, with no external fixtures beyond what this file builds inline.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn sample_document(str_element_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Zusi><Info DateiTyp="streckendatei" Version="A.1" MinVersion="A.1">"#,
    );
    for i in 0..8 {
        xml.push_str(&format!(r#"<AutorEintrag AutorID="{i}" AutorName="Autor {i}" Kommentar="erstellt"/>"#));
    }
    xml.push_str("</Info><Strecke>");
    for i in 0..str_element_count {
        xml.push_str(&format!(
            concat!(
                r#"<StrElement Nr="{i}" Laenge="12.345">"#,
                r#"<Vorgaenger X="1.0" Y="2.0" Z="3.0"/>"#,
                r#"<Nachfolger Nr="{next}"/>"#,
                r#"<Ausrichtung W="1.0" X="0.0" Y="0.0" Z="0.0"/>"#,
                r#"</StrElement>"#,
            ),
            i = i,
            next = i + 1,
        ));
    }
    xml.push_str("</Strecke></Zusi>");
    xml
}

fn bench_parse(c: &mut Criterion) {
    let small = sample_document(16);
    let large = sample_document(2_000);

    let mut group = c.benchmark_group("zusi_parser::parse");
    group.bench_function("strecke_16_elements", |b| {
        b.iter(|| zusi_parser::parse(black_box(small.as_bytes())).unwrap());
    });
    group.bench_function("strecke_2000_elements", |b| {
        b.iter(|| zusi_parser::parse(black_box(large.as_bytes())).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
