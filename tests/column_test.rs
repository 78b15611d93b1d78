//! Contract tests run against every representation through `Box<dyn Column>`

use luma_colstore::{
    create_column, create_column_with_config, create_compressed_column, AttributeType, Column, ColumnConfig,
    ColumnError, CompressionCodec, SortOrder, Value, ValueComparator, Verbosity,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CODECS: [CompressionCodec; 3] = [
    CompressionCodec::None,
    CompressionCodec::Dictionary,
    CompressionCodec::RunLength,
];

fn filled(codec: CompressionCodec, values: &[i32]) -> Box<dyn Column> {
    let mut col = create_compressed_column(AttributeType::Int, "ints", codec);
    for &v in values {
        col.insert(&Value::Int(v)).unwrap();
    }
    col
}

fn contents(col: &dyn Column) -> Vec<Value> {
    (0..col.len()).map(|tid| col.get(tid).unwrap()).collect()
}

#[test]
fn test_insert_get_in_order() {
    for codec in CODECS {
        let col = filled(codec, &[4, 4, 1, 4, 9]);
        assert_eq!(col.len(), 5);
        assert_eq!(
            contents(col.as_ref()),
            vec![Value::Int(4), Value::Int(4), Value::Int(1), Value::Int(4), Value::Int(9)]
        );
    }
}

#[test]
fn test_remove_renumbers_rows() {
    for codec in CODECS {
        let mut col = filled(codec, &[10, 20, 30, 40]);
        col.remove(1).unwrap();
        assert_eq!(col.len(), 3);
        assert_eq!(col.get(1).unwrap(), Value::Int(30));
        assert!(col.get(3).is_err());
    }
}

#[test]
fn test_clear_content() {
    for codec in CODECS {
        let mut col = filled(codec, &[1, 2, 3]);
        col.clear_content();
        assert!(col.is_empty());
        assert_eq!(col.size_in_bytes(), 0);
        col.insert(&Value::Int(5)).unwrap();
        assert_eq!(contents(col.as_ref()), vec![Value::Int(5)]);
    }
}

#[test]
fn test_copy_preserves_shape() {
    for codec in CODECS {
        let col = filled(codec, &[3, 3, 2]);
        let copy = col.copy();
        assert_eq!(copy.codec(), codec);
        assert_eq!(copy.name(), "ints");
        assert!(*copy == *col);
    }
}

#[test]
fn test_compression_is_transparent() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut columns: Vec<Box<dyn Column>> = CODECS
        .iter()
        .map(|&codec| create_compressed_column(AttributeType::Int, "ints", codec))
        .collect();

    for _ in 0..500 {
        let len = columns[0].len();
        let action = rng.gen_range(0..10);
        let value = Value::Int(rng.gen_range(0..4));
        for col in columns.iter_mut() {
            if action < 6 || len == 0 {
                col.insert(&value).unwrap();
            } else if action < 8 {
                col.update(len / 2, &value).unwrap();
            } else {
                col.remove(len - 1).unwrap();
            }
        }
    }

    let expected = contents(columns[0].as_ref());
    for col in &columns[1..] {
        assert_eq!(contents(col.as_ref()), expected);
        assert!(**col == *columns[0]);
        for v in 0..4 {
            for comparator in [ValueComparator::Less, ValueComparator::Equal, ValueComparator::Greater] {
                assert_eq!(
                    col.selection(&Value::Int(v), comparator).unwrap(),
                    columns[0].selection(&Value::Int(v), comparator).unwrap()
                );
            }
        }
        assert_eq!(col.sort(SortOrder::Ascending), columns[0].sort(SortOrder::Ascending));
        assert_eq!(col.sort(SortOrder::Descending), columns[0].sort(SortOrder::Descending));
    }
}

#[test]
fn test_parallel_selection_equals_selection() {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<i32> = (0..2_000).map(|_| rng.gen_range(-50..50)).collect();
    for codec in CODECS {
        let col = filled(codec, &values);
        let expected = col.selection(&Value::Int(0), ValueComparator::Less).unwrap();
        for threads in [1, 2, 7, 16] {
            assert_eq!(
                col.parallel_selection(&Value::Int(0), ValueComparator::Less, threads).unwrap(),
                expected
            );
        }
    }
}

#[test]
fn test_selection_type_mismatch() {
    let col = create_column(AttributeType::Float, "floats");
    let err = col.selection(&Value::Int(1), ValueComparator::Equal).unwrap_err();
    assert!(matches!(err, ColumnError::TypeMismatch { expected: AttributeType::Float, .. }));
}

#[test]
fn test_varchar_columns() {
    for codec in CODECS {
        let mut col = create_compressed_column(AttributeType::Varchar, "names", codec);
        for name in ["carol", "alice", "bob", "alice"] {
            col.insert(&Value::from(name)).unwrap();
        }
        assert_eq!(col.sort(SortOrder::Ascending), vec![1, 3, 2, 0]);
        assert_eq!(col.selection(&Value::from("alice"), ValueComparator::Equal).unwrap(), vec![1, 3]);
        assert!(matches!(col.add(&Value::from("x")), Err(ColumnError::UnsupportedOperation(_))));
    }
}

#[test]
fn test_boolean_columns_reject_arithmetic() {
    let mut col = create_compressed_column(AttributeType::Boolean, "flags", CompressionCodec::RunLength);
    col.insert(&Value::Bool(true)).unwrap();
    assert!(col.multiply(&Value::Bool(false)).is_err());
    assert_eq!(col.get(0).unwrap(), Value::Bool(true));
}

#[test]
fn test_float_arithmetic_on_every_codec() {
    for codec in CODECS {
        let mut col = create_compressed_column(AttributeType::Float, "floats", codec);
        for v in [1.0f32, 1.0, 3.0] {
            col.insert(&Value::Float(v)).unwrap();
        }
        col.multiply(&Value::Float(2.0)).unwrap();
        assert_eq!(
            contents(col.as_ref()),
            vec![Value::Float(2.0), Value::Float(2.0), Value::Float(6.0)]
        );
        assert!(col.divide(&Value::Float(0.0)).is_err());
        assert_eq!(col.get(2).unwrap(), Value::Float(6.0));
    }
}

#[test]
fn test_column_arithmetic_across_codecs() {
    let mut left = filled(CompressionCodec::RunLength, &[5, 5, 5, 8]);
    let right = filled(CompressionCodec::Dictionary, &[1, 2, 1, 2]);
    left.add_column(right.as_ref()).unwrap();
    assert_eq!(
        contents(left.as_ref()),
        vec![Value::Int(6), Value::Int(7), Value::Int(6), Value::Int(10)]
    );
}

#[test]
fn test_print_formats() {
    let plain = filled(CompressionCodec::None, &[1, 2]);
    assert_eq!(plain.print(), "| ints |\n________________________\n| 1 |\n| 2 |\n");

    let dict = filled(CompressionCodec::Dictionary, &[7, 8, 7]);
    assert_eq!(dict.print(), "ints(3)\n\t0: 7\n\t1: 8\n\t0: 7\n");

    let rle = filled(CompressionCodec::RunLength, &[7, 7, 8]);
    assert_eq!(rle.print(), "ints(3)\n7\n7\n8\n");
}

#[test]
fn test_verbose_operators_still_return_results() {
    luma_colstore::logging::init("luma_colstore=trace");
    let config = ColumnConfig {
        verbosity: Verbosity::Debug,
        time_operations: true,
        default_threads: 2,
    };
    let mut col = create_column_with_config(AttributeType::Int, "traced", CompressionCodec::Dictionary, config);
    for v in [1, 2, 1] {
        col.insert(&Value::Int(v)).unwrap();
    }
    let other = filled(CompressionCodec::None, &[1]);
    assert_eq!(col.nested_loop_join(other.as_ref()).unwrap().len(), 2);
    assert_eq!(col.sort(SortOrder::Descending), vec![1, 0, 2]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_representations_agree(
        values in prop::collection::vec(-3i32..3, 1..80),
        update_at in any::<prop::sample::Index>(),
        remove_at in any::<prop::sample::Index>(),
        new_value in -3i32..3,
    ) {
        let mut columns: Vec<Box<dyn Column>> = CODECS.iter().map(|&codec| filled(codec, &values)).collect();
        let update_tid = update_at.index(values.len());
        let remove_tid = remove_at.index(values.len());
        for col in columns.iter_mut() {
            col.update(update_tid, &Value::Int(new_value)).unwrap();
            col.remove(remove_tid).unwrap();
        }

        let mut expected = values.clone();
        expected[update_tid] = new_value;
        expected.remove(remove_tid);
        let expected: Vec<Value> = expected.into_iter().map(Value::Int).collect();
        for col in &columns {
            prop_assert_eq!(contents(col.as_ref()), expected.clone());
        }
    }
}
