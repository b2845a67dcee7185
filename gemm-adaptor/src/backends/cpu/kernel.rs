use half::{bf16, f16};

use super::buffer::AllocationTable;
use crate::{
    ArrayElement, DataType,
    backends::common::{
        KernelError,
        gpu_types::{DynamicSliceParams, GemmParams},
        kernel::gemm::{TileConfiguration, TileCoord},
    },
};

/// Runs the GEMM described by `params` block by block, the way the device
/// kernel walks its grid.
pub(crate) fn gemm(
    table: &AllocationTable,
    data_type: DataType,
    tile: &TileConfiguration,
    params: &GemmParams,
    slice: &DynamicSliceParams,
) -> Result<(), KernelError> {
    match data_type {
        DataType::F32 => gemm_typed::<f32>(table, tile, params, slice),
        DataType::F16 => gemm_typed::<f16>(table, tile, params, slice),
        DataType::BF16 => gemm_typed::<bf16>(table, tile, params, slice),
        other => Err(KernelError::UnsupportedDataType(other)),
    }
}

fn dimension(
    name: &str,
    value: i32,
) -> Result<usize, KernelError> {
    usize::try_from(value).map_err(|_| KernelError::MalformedArguments(format!("negative {name}: {value}")))
}

fn stride(
    name: &str,
    value: i64,
) -> Result<usize, KernelError> {
    usize::try_from(value).map_err(|_| KernelError::MalformedArguments(format!("negative {name}: {value}")))
}

/// Bytes spanned by `rows` rows of `columns` elements `leading_dimension` apart.
fn extent_bytes<T>(
    rows: usize,
    columns: usize,
    leading_dimension: usize,
) -> Option<usize> {
    if rows == 0 || columns == 0 {
        return Some(0);
    }
    (rows - 1).checked_mul(leading_dimension)?.checked_add(columns)?.checked_mul(size_of::<T>())
}

fn resolve_operand<T>(
    table: &AllocationTable,
    address: u64,
    rows: usize,
    columns: usize,
    leading_dimension: usize,
) -> Result<*mut T, KernelError> {
    let bytes = extent_bytes::<T>(rows, columns, leading_dimension).ok_or(KernelError::InvalidDeviceAddress {
        address,
        bytes: usize::MAX,
    })?;
    Ok(table.resolve(address, bytes)?.cast::<T>().as_ptr())
}

/// Output address after applying the dynamic slice offset, in whole output
/// matrices.
fn sliced_address<T>(
    table: &AllocationTable,
    address: u64,
    slice: &DynamicSliceParams,
    matrix_elements: usize,
) -> Result<u64, KernelError> {
    if slice.is_none() {
        return Ok(address);
    }
    let offset_ptr = table.resolve(slice.out, size_of::<i32>())?;
    // SAFETY: four bytes at `offset_ptr` belong to a live allocation.
    let offset = unsafe { offset_ptr.cast::<i32>().as_ptr().read_unaligned() };
    let offset = u64::try_from(offset)
        .map_err(|_| KernelError::MalformedArguments(format!("negative output slice offset {offset}")))?;
    offset
        .checked_mul(matrix_elements as u64)
        .and_then(|elements| elements.checked_mul(size_of::<T>() as u64))
        .and_then(|bytes| address.checked_add(bytes))
        .ok_or(KernelError::InvalidDeviceAddress {
            address,
            bytes: usize::MAX,
        })
}

fn gemm_typed<T: ArrayElement>(
    table: &AllocationTable,
    tile: &TileConfiguration,
    params: &GemmParams,
    slice: &DynamicSliceParams,
) -> Result<(), KernelError> {
    let m = dimension("M", params.M)?;
    let n = dimension("N", params.N)?;
    let k = dimension("K", params.K)?;
    let lda = stride("lda", params.lda)?;
    let ldb = stride("ldb", params.ldb)?;
    let ldc = stride("ldc", params.ldc)?;
    let ldd = stride("ldd", params.ldd)?;

    let a = resolve_operand::<T>(table, params.ptr_a, m, k, lda)?;
    let b = resolve_operand::<T>(table, params.ptr_b, k, n, ldb)?;
    let ptr_c = sliced_address::<T>(table, params.ptr_c, slice, m * n)?;
    let ptr_d = sliced_address::<T>(table, params.ptr_d, slice, m * n)?;
    let c = resolve_operand::<T>(table, ptr_c, m, n, ldc)?;
    let d = resolve_operand::<T>(table, ptr_d, m, n, ldd)?;

    let tiled_shape = TileCoord::new(
        dimension("tiles_m", params.tiles_m)? as u32,
        dimension("tiles_n", params.tiles_n)? as u32,
        dimension("tiles_k", params.tiles_k)? as u32,
    );
    let grid = tile.traversal.grid_shape(tiled_shape);
    let (tile_m, tile_n) = (tile.tile_m as usize, tile.tile_n as usize);

    for z in 0..grid.z {
        for y in 0..grid.y {
            for x in 0..grid.x {
                let offset = tile.traversal.tile_offset(x, y, z);
                if !tiled_shape.contains(&offset) {
                    continue;
                }
                let rows = (offset.m as usize * tile_m)..((offset.m as usize + 1) * tile_m).min(m);
                let columns = (offset.n as usize * tile_n)..((offset.n as usize + 1) * tile_n).min(n);
                for row in rows {
                    for column in columns.clone() {
                        let mut accumulator = 0f32;
                        for reduction in 0..k {
                            // SAFETY: indices stay inside the extents resolved above.
                            let (lhs, rhs) = unsafe {
                                (
                                    a.add(row * lda + reduction).read_unaligned(),
                                    b.add(reduction * ldb + column).read_unaligned(),
                                )
                            };
                            accumulator += to_f32(lhs) * to_f32(rhs);
                        }

                        let mut value = params.alpha * accumulator;
                        if params.beta != 0.0 {
                            // SAFETY: as above.
                            let source = unsafe { c.add(row * ldc + column).read_unaligned() };
                            value += params.beta * to_f32(source);
                        }
                        let value = <T as num_traits::NumCast>::from(value).ok_or_else(|| {
                            KernelError::MalformedArguments(format!("{value} is not representable as {}", T::data_type()))
                        })?;
                        // SAFETY: as above.
                        unsafe { d.add(row * ldd + column).write_unaligned(value) };
                    }
                }
            }
        }
    }
    Ok(())
}

fn to_f32<T: ArrayElement>(value: T) -> f32 {
    value.to_f32().unwrap_or(f32::NAN)
}
