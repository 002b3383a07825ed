//! TFLite model header tables.
//!
//! Hand-maintained subset of the `flatc --rust` output for
//! `tensorflow/lite/schema/schema.fbs`: only the root `Model` table's
//! `version` and `operator_codes` fields and the `OperatorCode` table.
//! Field slots match the upstream schema, so the verifier only walks
//! those fields and never touches subgraphs or weight buffers.

use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, Vector, VOffsetT, WIPOffset};

/// Schema version this firmware's interpreter understands.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 3;

/// FlatBuffer file identifier for TFLite models.
pub const FILE_IDENTIFIER: &str = "TFL3";

// ---------------------------------------------------------------------------
// BuiltinOperator
// ---------------------------------------------------------------------------

/// TFLite builtin operator code (open enum, as flatc generates it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct BuiltinOperator(pub i32);

impl BuiltinOperator {
    pub const ADD: Self = Self(0);
    pub const AVERAGE_POOL_2D: Self = Self(1);
    pub const CONV_2D: Self = Self(3);
    pub const DEPTHWISE_CONV_2D: Self = Self(4);
    pub const DEQUANTIZE: Self = Self(6);
    pub const FULLY_CONNECTED: Self = Self(9);
    pub const LOGISTIC: Self = Self(14);
    pub const MAX_POOL_2D: Self = Self(17);
    pub const RESHAPE: Self = Self(22);
    pub const SOFTMAX: Self = Self(25);
    pub const CUSTOM: Self = Self(32);
    pub const QUANTIZE: Self = Self(114);

    /// Value stored in `deprecated_builtin_code` for codes that no longer
    /// fit in an `i8`.
    pub const PLACEHOLDER_FOR_GREATER_OP_CODES: i8 = 127;
}

// ---------------------------------------------------------------------------
// OperatorCode table
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, PartialEq)]
pub struct OperatorCode<'a> {
    pub _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for OperatorCode<'a> {
    type Inner = OperatorCode<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { flatbuffers::Table::new(buf, loc) },
        }
    }
}

impl<'a> OperatorCode<'a> {
    pub const VT_DEPRECATED_BUILTIN_CODE: VOffsetT = 4;
    pub const VT_CUSTOM_CODE: VOffsetT = 6;
    pub const VT_VERSION: VOffsetT = 8;
    pub const VT_BUILTIN_CODE: VOffsetT = 10;

    #[inline]
    pub fn deprecated_builtin_code(&self) -> i8 {
        // SAFETY: the table was verified by `flatbuffers::root`.
        unsafe {
            self._tab
                .get::<i8>(Self::VT_DEPRECATED_BUILTIN_CODE, Some(0))
                .unwrap_or(0)
        }
    }

    #[inline]
    pub fn builtin_code(&self) -> i32 {
        // SAFETY: the table was verified by `flatbuffers::root`.
        unsafe {
            self._tab
                .get::<i32>(Self::VT_BUILTIN_CODE, Some(0))
                .unwrap_or(0)
        }
    }

    #[inline]
    pub fn custom_code(&self) -> Option<&'a str> {
        // SAFETY: the table was verified by `flatbuffers::root`.
        unsafe {
            self._tab
                .get::<ForwardsUOffset<&str>>(Self::VT_CUSTOM_CODE, None)
        }
    }

    /// Effective operator code.
    ///
    /// Older converters only write `deprecated_builtin_code`; newer ones
    /// write both and park `127` in the deprecated slot for large codes.
    /// The larger of the two is authoritative.
    pub fn resolved_code(&self) -> BuiltinOperator {
        BuiltinOperator(i32::from(self.deprecated_builtin_code()).max(self.builtin_code()))
    }
}

impl flatbuffers::Verifiable for OperatorCode<'_> {
    #[inline]
    fn run_verifier(
        v: &mut flatbuffers::Verifier,
        pos: usize,
    ) -> Result<(), flatbuffers::InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<i8>(
                "deprecated_builtin_code",
                Self::VT_DEPRECATED_BUILTIN_CODE,
                false,
            )?
            .visit_field::<ForwardsUOffset<&str>>("custom_code", Self::VT_CUSTOM_CODE, false)?
            .visit_field::<i32>("version", Self::VT_VERSION, false)?
            .visit_field::<i32>("builtin_code", Self::VT_BUILTIN_CODE, false)?
            .finish();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Model table (root)
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, PartialEq)]
pub struct Model<'a> {
    pub _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for Model<'a> {
    type Inner = Model<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { flatbuffers::Table::new(buf, loc) },
        }
    }
}

impl<'a> Model<'a> {
    pub const VT_VERSION: VOffsetT = 4;
    pub const VT_OPERATOR_CODES: VOffsetT = 6;

    #[inline]
    pub fn version(&self) -> u32 {
        // SAFETY: the table was verified by `flatbuffers::root`.
        unsafe { self._tab.get::<u32>(Self::VT_VERSION, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn operator_codes(&self) -> Option<Vector<'a, ForwardsUOffset<OperatorCode<'a>>>> {
        // SAFETY: the table was verified by `flatbuffers::root`.
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<OperatorCode<'a>>>>>(
                    Self::VT_OPERATOR_CODES,
                    None,
                )
        }
    }
}

impl flatbuffers::Verifiable for Model<'_> {
    #[inline]
    fn run_verifier(
        v: &mut flatbuffers::Verifier,
        pos: usize,
    ) -> Result<(), flatbuffers::InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("version", Self::VT_VERSION, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<OperatorCode>>>>(
                "operator_codes",
                Self::VT_OPERATOR_CODES,
                false,
            )?
            .finish();
        Ok(())
    }
}

/// Map and verify the header of a TFLite model blob.
pub fn root_as_model(buf: &[u8]) -> Result<Model<'_>, flatbuffers::InvalidFlatbuffer> {
    flatbuffers::root::<Model>(buf)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Serialise a header-only model: `version` plus one `OperatorCode` per
/// entry in `operators`.
///
/// The engine side of a real model (subgraphs, buffers) is absent, so the
/// result is only useful with engines that do not parse the graph
/// (host simulation, tests, fuzz seeds).
pub fn build_header(version: u32, operators: &[BuiltinOperator]) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();

    let codes: Vec<WIPOffset<OperatorCode>> = operators
        .iter()
        .map(|op| {
            let deprecated = i8::try_from(op.0)
                .unwrap_or(BuiltinOperator::PLACEHOLDER_FOR_GREATER_OP_CODES);
            let start = fbb.start_table();
            fbb.push_slot::<i32>(OperatorCode::VT_BUILTIN_CODE, op.0, 0);
            fbb.push_slot::<i8>(OperatorCode::VT_DEPRECATED_BUILTIN_CODE, deprecated, 0);
            WIPOffset::new(fbb.end_table(start).value())
        })
        .collect();
    let codes = fbb.create_vector(&codes);

    let start = fbb.start_table();
    fbb.push_slot_always::<WIPOffset<_>>(Model::VT_OPERATOR_CODES, codes);
    fbb.push_slot::<u32>(Model::VT_VERSION, version, 0);
    let root: WIPOffset<Model> = WIPOffset::new(fbb.end_table(start).value());

    fbb.finish(root, Some(FILE_IDENTIFIER));
    fbb.finished_data().to_vec()
}
