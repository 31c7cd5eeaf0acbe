//! Native function registration for the standard libraries
//!
//! Registers the `core` and `fixed` natives by the names a Pawn program
//! imports them under. Arguments a script leaves out read as zero unless a
//! native documents another default.

use crate::{chars, fixed, math};
use amx_sdk::{
    arg, AmxError, AmxResult, Cell, NativeContext, NativeFunctionRegistry, NativeLibrary, CELL_SIZE,
};

/// Name of the core library
pub const CORE_LIBRARY: &str = "core";

/// Name of the fixed-point library
pub const FIXED_LIBRARY: &str = "fixed";

/// Report a failed computation through the machine and return zero
fn raise(ctx: &mut dyn NativeContext, result: AmxResult<i32>) -> AmxResult<Cell> {
    match result {
        Ok(value) => Ok(Cell::new(value)),
        Err(err) => {
            ctx.raise_error(err);
            Ok(Cell::ZERO)
        }
    }
}

/// Buffer size argument in cells; must be positive
fn buffer_cells(args: &[Cell], index: usize) -> AmxResult<usize> {
    match arg(args, index).as_i32() {
        n if n > 0 => Ok(n as usize),
        _ => Err(AmxError::ParameterError),
    }
}

/// The `core` library
pub fn core_library() -> NativeLibrary {
    let mut library = NativeLibrary::new(CORE_LIBRARY);
    register_core(library.registry_mut());
    library
}

/// The `fixed` library
pub fn fixed_library() -> NativeLibrary {
    let mut library = NativeLibrary::new(FIXED_LIBRARY);
    register_fixed(library.registry_mut());
    library
}

/// Register core natives
pub fn register_core(registry: &mut NativeFunctionRegistry) {
    registry.register("heapspace", |ctx, _args| Ok(ctx.heap_space()));

    registry.register("funcidx", |ctx, args| {
        let name = ctx.read_string(arg(args, 0))?;
        Ok(Cell::new(ctx.find_public(&name).map_or(-1, |i| i as i32)))
    });

    // ========================================================================
    // Strings
    // ========================================================================

    registry.register("strlen", |ctx, args| {
        let len = ctx.str_len(arg(args, 0))?;
        Ok(Cell::new(len as i32))
    });

    registry.register("strpack", |ctx, args| {
        let text = ctx.read_string(arg(args, 1))?;
        let cells = buffer_cells(args, 2)?;
        ctx.write_string(arg(args, 0), &text, true, cells)?;
        Ok(Cell::new(text.chars().count().min(cells * CELL_SIZE - 1) as i32))
    });

    registry.register("strunpack", |ctx, args| {
        let text = ctx.read_string(arg(args, 1))?;
        let cells = buffer_cells(args, 2)?;
        ctx.write_string(arg(args, 0), &text, false, cells)?;
        Ok(Cell::new(text.chars().count().min(cells - 1) as i32))
    });

    // ========================================================================
    // Characters
    // ========================================================================

    registry.register("tolower", |_ctx, args| {
        Ok(Cell::new(chars::to_lower(arg(args, 0).as_i32())))
    });
    registry.register("toupper", |_ctx, args| {
        Ok(Cell::new(chars::to_upper(arg(args, 0).as_i32())))
    });
    registry.register("swapchars", |_ctx, args| {
        Ok(Cell::new(chars::swap_chars(arg(args, 0).as_i32())))
    });

    // ========================================================================
    // Numbers
    // ========================================================================

    registry.register("random", |_ctx, args| {
        Ok(Cell::new(math::random(arg(args, 0).as_i32())))
    });
    registry.register("min", |_ctx, args| {
        Ok(Cell::new(math::min(arg(args, 0).as_i32(), arg(args, 1).as_i32())))
    });
    registry.register("max", |_ctx, args| {
        Ok(Cell::new(math::max(arg(args, 0).as_i32(), arg(args, 1).as_i32())))
    });
    registry.register("clamp", |_ctx, args| {
        let low = args.get(1).map_or(i32::MIN, |c| c.as_i32());
        let high = args.get(2).map_or(i32::MAX, |c| c.as_i32());
        Ok(Cell::new(math::clamp(arg(args, 0).as_i32(), low, high)))
    });
}

/// Register fixed-point natives
pub fn register_fixed(registry: &mut NativeFunctionRegistry) {
    registry.register("fixed", |ctx, args| {
        raise(ctx, fixed::from_int(arg(args, 0).as_i32()))
    });

    registry.register("strfixed", |ctx, args| {
        let text = ctx.read_string(arg(args, 0))?;
        raise(ctx, fixed::parse(&text))
    });

    registry.register("fmul", |ctx, args| {
        raise(ctx, fixed::mul(arg(args, 0).as_i32(), arg(args, 1).as_i32()))
    });
    registry.register("fdiv", |ctx, args| {
        raise(ctx, fixed::div(arg(args, 0).as_i32(), arg(args, 1).as_i32()))
    });
    registry.register("fmuldiv", |ctx, args| {
        let (a, b, c) = (arg(args, 0), arg(args, 1), arg(args, 2));
        raise(ctx, fixed::mul_div(a.as_i32(), b.as_i32(), c.as_i32()))
    });

    registry.register("ffract", |_ctx, args| {
        Ok(Cell::new(fixed::fract(arg(args, 0).as_i32())))
    });
    registry.register("fround", |ctx, args| {
        let value = arg(args, 0).as_i32();
        let rounded = fixed::RoundMode::from_code(arg(args, 1).as_i32())
            .map(|mode| fixed::round(value, mode));
        raise(ctx, rounded)
    });

    registry.register("fpower", |ctx, args| {
        raise(ctx, fixed::power(arg(args, 0).as_i32(), arg(args, 1).as_i32()))
    });
    registry.register("fsqroot", |ctx, args| {
        raise(ctx, fixed::sqroot(arg(args, 0).as_i32()))
    });
    registry.register("fabs", |ctx, args| {
        raise(ctx, fixed::abs(arg(args, 0).as_i32()))
    });
}
