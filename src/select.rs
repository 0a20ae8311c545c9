//! Runtime selection of (strategy, element type, square order).
//!
//! Callers hold three runtime tags. [`dispatch`] turns them into exactly
//! one call of [`OrderVisitor::visit`] with the element type and order as
//! compile-time parameters, so the visitor can build `Matrix<T, N, N>`
//! values. Unsupported orders are rejected with an error; there is no
//! fallback.

use crate::error::{MatmulError, Result};
use crate::matrix::DataType;
use crate::strategy::MultType;
use crate::Element;

/// Square orders with a compiled entry point.
pub const SUPPORTED_ORDERS: [usize; 5] = [2, 128, 256, 512, 1024];

/// One benchmark cell: which strategy, element type and order to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub mult: MultType,
    pub dtype: DataType,
    pub order: usize,
}

impl Selection {
    /// Validates `order` against [`SUPPORTED_ORDERS`].
    pub fn new(mult: MultType, dtype: DataType, order: usize) -> Result<Self> {
        check_order(order)?;
        Ok(Self { mult, dtype, order })
    }

    /// Every combination of the given tags, orders outermost.
    pub fn grid(orders: &[usize], mults: &[MultType], dtypes: &[DataType]) -> Result<Vec<Self>> {
        let mut cells = Vec::with_capacity(orders.len() * mults.len() * dtypes.len());
        for &order in orders {
            for &mult in mults {
                for &dtype in dtypes {
                    cells.push(Self::new(mult, dtype, order)?);
                }
            }
        }
        Ok(cells)
    }
}

/// Receives the monomorphized call for one [`Selection`].
pub trait OrderVisitor {
    type Output;

    fn visit<T: Element, const N: usize>(&mut self, mult: MultType) -> Result<Self::Output>;
}

/// Calls `visitor` with the element type and order named by `selection`.
///
/// # Errors
///
/// [`MatmulError::UnsupportedOrder`] if the order has no entry point, plus
/// whatever the visitor returns.
pub fn dispatch<V: OrderVisitor>(visitor: &mut V, selection: Selection) -> Result<V::Output> {
    let Selection { mult, dtype, order } = selection;
    match dtype {
        DataType::Int32 => dispatch_order::<i32, V>(visitor, mult, order),
        DataType::Uint32 => dispatch_order::<u32, V>(visitor, mult, order),
        DataType::Float => dispatch_order::<f32, V>(visitor, mult, order),
        DataType::Double => dispatch_order::<f64, V>(visitor, mult, order),
    }
}

fn dispatch_order<T: Element, V: OrderVisitor>(
    visitor: &mut V,
    mult: MultType,
    order: usize,
) -> Result<V::Output> {
    match order {
        2 => visitor.visit::<T, 2>(mult),
        128 => visitor.visit::<T, 128>(mult),
        256 => visitor.visit::<T, 256>(mult),
        512 => visitor.visit::<T, 512>(mult),
        1024 => visitor.visit::<T, 1024>(mult),
        other => Err(MatmulError::UnsupportedOrder(other)),
    }
}

fn check_order(order: usize) -> Result<()> {
    if SUPPORTED_ORDERS.contains(&order) {
        Ok(())
    } else {
        Err(MatmulError::UnsupportedOrder(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shape;

    impl OrderVisitor for Shape {
        type Output = (DataType, usize, MultType);

        fn visit<T: Element, const N: usize>(&mut self, mult: MultType) -> Result<Self::Output> {
            Ok((T::DATA_TYPE, N, mult))
        }
    }

    #[test]
    fn test_dispatch_reaches_matching_entry_point() {
        for order in SUPPORTED_ORDERS {
            for dtype in DataType::ALL {
                let sel = Selection::new(MultType::Simd, dtype, order).unwrap();
                assert_eq!(dispatch(&mut Shape, sel).unwrap(), (dtype, order, MultType::Simd));
            }
        }
    }

    #[test]
    fn test_unsupported_order_rejected() {
        assert!(matches!(
            Selection::new(MultType::Naive, DataType::Float, 100),
            Err(MatmulError::UnsupportedOrder(100))
        ));

        // Bypassing the constructor still can't reach a missing entry point.
        let sel = Selection {
            mult: MultType::Naive,
            dtype: DataType::Int32,
            order: 3,
        };
        assert!(matches!(
            dispatch(&mut Shape, sel),
            Err(MatmulError::UnsupportedOrder(3))
        ));
    }

    #[test]
    fn test_grid_order() {
        let cells = Selection::grid(
            &[2, 128],
            &[MultType::Naive, MultType::Simd],
            &[DataType::Float],
        )
        .unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].order, 2);
        assert_eq!(cells[1].mult, MultType::Simd);
        assert_eq!(cells[3].order, 128);
    }
}
