use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use wfdbannot::{
    Annotation, AnnotationCode, AnnotationError, ByteOrder, EncodedAnnotations,
    InterchangeLayout, PointerWidth, Time,
};

// 清理测试文件的辅助函数
fn cleanup_test_file(filename: &str) {
    if Path::new(filename).exists() {
        fs::remove_file(filename).ok();
    }
}

// 创建一段带节律标注的测试注释流
fn create_test_stream() -> Vec<Annotation> {
    let mut anns = vec![Annotation::new(Time::new(0), AnnotationCode::RHYTHM)
        .with_aux("(N")
        .unwrap()];
    for i in 1..=50 {
        let code = if i % 10 == 0 {
            AnnotationCode::PVC
        } else {
            AnnotationCode::NORMAL
        };
        anns.push(
            Annotation::new(Time::new(i * 288), code)
                .with_chan((i % 2) as u8)
                .with_subtype((i % 7) as u8),
        );
    }
    anns.push(
        Annotation::new(Time::new(51 * 288), AnnotationCode::NOTE)
            .with_num(3)
            .with_aux("end of segment")
            .unwrap(),
    );
    anns
}

#[test]
fn test_block_file_write_read() {
    let filename = "test_interchange_block.bin";
    let original = create_test_stream();

    for layout in [
        InterchangeLayout::new(PointerWidth::Four, ByteOrder::Little),
        InterchangeLayout::new(PointerWidth::Eight, ByteOrder::Big),
        InterchangeLayout::default(),
    ] {
        // 写入阶段
        {
            let encoded = layout.encode(&original).unwrap();
            let file = File::create(filename).unwrap();
            encoded.write_to(BufWriter::new(file)).unwrap();
        }

        // 读取阶段
        {
            let file = File::open(filename).unwrap();
            let encoded = EncodedAnnotations::read_from(BufReader::new(file)).unwrap();
            assert_eq!(encoded.layout, layout);
            assert_eq!(encoded.len(), original.len());

            let decoded = encoded.decode().unwrap();
            for (i, (d, o)) in decoded.iter().zip(&original).enumerate() {
                assert!(d.structural_eq(o), "record {} differs: {:?} vs {:?}", i, d, o);
            }
            println!(
                "{:?}: {} records, {} record bytes, {} pool bytes",
                layout,
                encoded.len(),
                encoded.records.len(),
                encoded.aux_pool.len()
            );
        }
    }

    cleanup_test_file(filename);
}

#[test]
fn test_aux_pool_only_holds_present_text() {
    let layout = InterchangeLayout::new(PointerWidth::Four, ByteOrder::Little);
    let encoded = layout.encode(&create_test_stream()).unwrap();

    // 保留字节 + "(N" + "end of segment"
    assert_eq!(encoded.aux_pool.len(), 1 + (1 + 2) + (1 + 14));
    assert_eq!(encoded.records.len(), 52 * 12);
}

#[test]
fn test_corrupt_length_byte_is_reported() {
    let layout = InterchangeLayout::new(PointerWidth::Eight, ByteOrder::Little);
    let mut encoded = layout.encode(&create_test_stream()).unwrap();

    // "(N" 的长度字节改成超出池大小
    encoded.aux_pool[1] = 250;
    match encoded.decode() {
        Err(AnnotationError::CorruptBuffer { stated, available }) => {
            assert_eq!(stated, 250);
            assert!(available < stated);
        }
        other => panic!("expected CorruptBuffer, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn test_empty_stream_block() {
    let layout = InterchangeLayout::default();
    let encoded = layout.encode(&[]).unwrap();
    assert!(encoded.is_empty());

    let mut bytes = Vec::new();
    encoded.write_to(&mut bytes).unwrap();
    let decoded = EncodedAnnotations::read_from(bytes.as_slice())
        .unwrap()
        .decode()
        .unwrap();
    assert!(decoded.is_empty());
}
