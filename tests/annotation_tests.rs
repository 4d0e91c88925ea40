use std::collections::HashSet;

use wfdbannot::{
    stream, Annotation, AnnotationCode, AnnotationError, CodeTable, SamplingFrequency, Time,
};

// 创建测试注释的辅助函数
fn create_test_annotation(time: i32, code: AnnotationCode, num: u8) -> Annotation {
    Annotation::new(Time::new(time), code).with_num(num)
}

#[test]
fn test_aux_round_trip() {
    let samples = vec![
        "a".to_string(),
        "(AFIB".to_string(),
        "http://physionet.org/".to_string(),
        " leading and trailing ".to_string(),
        "\ttab\x01control".to_string(),
        "~".repeat(255),
    ];

    let mut annotation = create_test_annotation(0, AnnotationCode::NOTE, 0);
    for text in &samples {
        annotation.set_aux(text).unwrap();
        assert_eq!(annotation.aux(), text.as_str());
        assert_eq!(annotation.aux_text().len(), text.len());
        println!("aux round trip: {} bytes", text.len());
    }
}

#[test]
fn test_every_ascii_byte_round_trips() {
    let all: String = (0u8..=127).map(char::from).collect();
    let mut annotation = Annotation::default();
    annotation.set_aux(&all).unwrap();
    assert_eq!(annotation.aux(), all);

    let prefixed = annotation.aux_text().to_prefixed();
    assert_eq!(prefixed[0], 128);
    assert_eq!(&prefixed[1..], all.as_bytes());
}

#[test]
fn test_empty_aux_never_allocates() {
    let mut annotation = create_test_annotation(5, AnnotationCode::NORMAL, 0);
    assert!(!annotation.aux_text().is_allocated());

    annotation.set_aux("").unwrap();
    assert!(!annotation.aux_text().is_allocated());

    annotation.set_aux("x").unwrap();
    assert!(annotation.aux_text().is_allocated());

    annotation.set_aux("").unwrap();
    assert!(!annotation.aux_text().is_allocated());
    assert_eq!(annotation.aux(), "");
}

#[test]
fn test_oversize_write_clears_aux() {
    let mut annotation = create_test_annotation(0, AnnotationCode::NORMAL, 0)
        .with_aux("previous")
        .unwrap();

    let result = annotation.set_aux(&"A".repeat(256));
    match result {
        Err(AnnotationError::OversizeText { len }) => assert_eq!(len, 256),
        other => panic!("expected OversizeText, got {:?}", other),
    }
    assert!(!annotation.aux_text().is_allocated());
    assert_eq!(annotation.aux(), "");
}

#[test]
fn test_non_ascii_write_rejected() {
    let mut annotation = Annotation::default();
    let err = annotation.set_aux("40 µV").unwrap_err();
    assert!(matches!(err, AnnotationError::NonAsciiText { position: 3 }));
    assert!(!annotation.aux_text().is_allocated());
    println!("rejected: {}", err);
}

#[test]
fn test_from_parts_rejects_bad_aux() {
    let result = Annotation::from_parts(Time::new(0), AnnotationCode::NORMAL, 0, 0, 0, "ü");
    assert!(result.is_err());
}

#[test]
fn test_equality_ignores_subtype_channel_aux() {
    let a = Annotation::from_parts(Time::new(100), AnnotationCode::new(1), 0, 0, 0, "x").unwrap();
    let b = Annotation::from_parts(Time::new(100), AnnotationCode::new(1), 5, 1, 0, "").unwrap();

    assert_eq!(a, b);
    assert!(a.equals(&b));
    assert!(!a.structural_eq(&b));

    let set: HashSet<Annotation> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_ordering_by_time_only() {
    let early = Annotation::from_parts(Time::new(50), AnnotationCode::PVC, 9, 3, 7, "late?").unwrap();
    let late = create_test_annotation(100, AnnotationCode::NORMAL, 0);
    assert!(early < late);
    assert!(late > early);

    let x = create_test_annotation(100, AnnotationCode::NORMAL, 0);
    let y = create_test_annotation(100, AnnotationCode::NORMAL, 2);
    assert!(!(x < y) && !(x > y));
    assert!(x.partial_cmp(&y).is_none());
}

#[test]
fn test_display_format() {
    let annotation = create_test_annotation(0, AnnotationCode::new(1), 0);
    assert_eq!(annotation.to_string(), "0:00.000 - N, Normal beat");

    let mut table = CodeTable::standard();
    table
        .define(AnnotationCode::new(42), "Z", "Seizure onset")
        .unwrap();
    let freq = SamplingFrequency::new(128.0).unwrap();
    let custom = create_test_annotation(128 * 3725, AnnotationCode::new(42), 0);
    assert_eq!(
        custom.to_display_string(&table, freq),
        "1:02:05.000 - Z, Seizure onset"
    );
}

#[test]
fn test_sort_and_dedup_stream() {
    // 两个注释者对同一批心搏的标注
    let mut anns = Vec::new();
    for num in 0..2u8 {
        for beat in (0..10).rev() {
            let aux = format!("annotator {}", num);
            anns.push(
                create_test_annotation(beat * 200, AnnotationCode::NORMAL, num)
                    .with_aux(&aux)
                    .unwrap(),
            );
        }
    }
    // 重复一遍第一位注释者的标注
    let repeat: Vec<Annotation> = anns.iter().filter(|a| a.num() == 0).cloned().collect();
    anns.extend(repeat);
    assert_eq!(anns.len(), 30);

    stream::sort_by_time(&mut anns);
    assert!(stream::is_time_ordered(&anns));

    let removed = stream::dedup_events(&mut anns);
    assert_eq!(removed, 10);
    assert_eq!(anns.len(), 20);
    assert!(stream::is_time_ordered(&anns));

    // 排序稳定：同一时刻注释者0的标注排在前面
    assert_eq!(anns[0].num(), 0);
    assert_eq!(anns[1].num(), 1);
    assert_eq!(anns[0].aux(), "annotator 0");
}
